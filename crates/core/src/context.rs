use crate::models::{Chunk, ConsultedDocument};
use crate::tokenizer::TokenCounter;

pub fn group_by_document<'a, I>(chunks: I) -> Vec<ConsultedDocument>
where
    I: IntoIterator<Item = &'a Chunk>,
{
    let mut documents: Vec<ConsultedDocument> = Vec::new();

    for chunk in chunks {
        match documents
            .iter_mut()
            .find(|document| document.name == chunk.document)
        {
            Some(document) => document.excerpts.push(chunk.text.clone()),
            None => documents.push(ConsultedDocument {
                name: chunk.document.clone(),
                excerpts: vec![chunk.text.clone()],
            }),
        }
    }

    documents
}

pub fn assemble_documents(documents: &[ConsultedDocument]) -> String {
    documents
        .iter()
        .map(|document| format!("[Document: {}]\n{}", document.name, document.excerpts.join("\n")))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn assemble<'a, I>(chunks: I) -> String
where
    I: IntoIterator<Item = &'a Chunk>,
{
    assemble_documents(&group_by_document(chunks))
}

pub fn truncate(context: &str, max_tokens: usize, counter: &dyn TokenCounter) -> String {
    if counter.count_tokens(context) <= max_tokens {
        return context.to_string();
    }

    let mut kept = String::new();
    for (position, line) in context.split('\n').enumerate() {
        let candidate = if position == 0 {
            line.to_string()
        } else {
            format!("{kept}\n{line}")
        };

        if counter.count_tokens(&candidate) > max_tokens {
            break;
        }
        kept = candidate;
    }

    kept
}
