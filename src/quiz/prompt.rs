/// Number of questions the model is asked for.
pub const QUESTION_COUNT: usize = 10;

/// Fixed task text + corpus, as sent to the backend.
pub fn build(corpus: &str) -> String {
    format!(
        "EXTRACT knowledge from the text below and FORMAT it as a JSON quiz.\n\n\
         REQUIREMENTS:\n\
         1. Identify key entities and group them as people, organizations and locations.\n\
         2. Generate exactly {count} distinct questions, each with 4 options and a balanced mix of low, medium and high difficulty.\n\
         3. The \"answer\" field must be an exact string match for one of the \"options\".\n\
         4. Provide a succinct \"explanation\" for each correct answer.\n\
         5. List related topics for further study.\n\
         6. Respond with JSON only, no prose and no markdown.\n\n\
         SCHEMA:\n\
         {{\n  \
           \"key_entities\": {{ \"people\": [], \"organizations\": [], \"locations\": [] }},\n  \
           \"quiz\": [{{ \"question\": \"\", \"options\": [], \"answer\": \"\", \"difficulty\": \"\", \"explanation\": \"\" }}],\n  \
           \"related_topics\": []\n\
         }}\n\n\
         TARGET CONTENT:\n{corpus}",
        count = QUESTION_COUNT,
        corpus = corpus,
    )
}
