// Prompt text for resume screening.

/// Appended to the requirement text. The model must answer with a single
/// dictionary literal using exactly these keys.
pub const OUTPUT_SHAPE_INSTRUCTION: &str = " Please go through the resume and tell me if the \
    candidate is a good fit for the role. I want the output to be a single python dictionary. \
    The format I want is {'NAME': '...', 'YEARS OF EXPERIENCE': '...', \
    'KEY STRENGTHS': ['...', '...'], 'SUMMARY': '...', \
    'SUITABLE FOR MY REQUIREMENT (Y/N)': 'Y/N', 'OVERFIT (Y/N)': 'Y/N'}. \
    The Dictionary keys MUST be exactly as shown. The values should be the information \
    extracted from the resume or your assessment.";

/// Requirement text followed by the output-shape instruction.
pub fn build_extraction_prompt(requirement_text: &str) -> String {
    format!("{}{}", requirement_text, OUTPUT_SHAPE_INSTRUCTION)
}
