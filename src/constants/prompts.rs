pub const QUESTION_EXTRACTION_PROMPT: &str = "Identify and extract all distinct questions presented in the document. \
For each question, assign a unique string ID (e.g., 'q1', 'q2a', 'q3') and extract its full text into 'questionText'. \
Sub-questions that must be answered separately get their own entry. \
Do not invent questions that are not in the document; if it contains none, return an empty 'questions' array. \
Return the results as a single JSON object conforming to the specified schema, with no surrounding prose or markdown.";

pub const LESSON_TUTOR_ROLE: &str = "You are an expert tutor AI.";

pub const LESSON_GENERATION_PROMPT: &str = "Generate a detailed, step-by-step educational lesson explaining how to understand and solve that specific question. \
Ignore every other question in the document. \
Your response MUST strictly adhere to the provided JSON schema, wrapped in a top-level 'lessonData' object.";

pub const LESSON_FIELD_INSTRUCTIONS: &str = "Extract the full question text accurately into 'questionText'. \
Determine the 'subject' and 'topic' for this question. \
Write a clear explanation for 'coreConceptHtml' using only these HTML tags: <p>, <ul>, <ol>, <li>, <code>, <strong>, <em>, <br>. \
Provide detailed steps in the 'steps' array, each with 'stepNumber' (starting at 1 and increasing by one), 'title' (plain text) and 'descriptionHtml' (same HTML tags allowed). \
Include helpful 'hints' as a list of strings (may contain simple HTML like <strong>); use an empty list if there are none.";

pub const VISUAL_AID_POLICY: &str = "Identify if a relevant graph or image is directly associated with *this specific question* in the PDF. \
If so, include the 'visualAid' object with 'isPresent' set to true and 'imageUrl' set to null. \
If not, omit 'visualAid' or set 'isPresent' to false.";
