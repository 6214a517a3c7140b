use pdf_qa_core::{Answer, CompletionError, Corpus, LoadError, LoadReport, QueryError, Turn, TurnReply};

pub const LOAD_FIRST_NOTICE: &str =
    "Por favor, primero cargue los documentos (use :load en el chat, o el comando ask que los carga).";
pub const ASK_A_QUESTION_NOTICE: &str = "Por favor, formule una pregunta específica sobre retail.";

pub fn turn(turn: &Turn) -> String {
    let mut out = String::new();

    if let Some(greeting) = &turn.greeting {
        out.push_str(greeting);
        out.push('\n');
    }

    match &turn.reply {
        TurnReply::Answered(answer) => out.push_str(&self::answer(answer)),
        TurnReply::Failed(error) => {
            out.push_str(&query_failure(error));
            out.push('\n');
        }
        TurnReply::NeedsDocuments { .. } => {
            out.push_str(LOAD_FIRST_NOTICE);
            out.push('\n');
        }
        TurnReply::NeedsQuestion => {
            out.push_str(ASK_A_QUESTION_NOTICE);
            out.push('\n');
        }
        TurnReply::GreetingOnly => {}
    }

    out
}

pub fn answer(answer: &Answer) -> String {
    let mut out = format!("Respuesta:\n{}\n\n", answer.completion.text.trim());
    out.push_str(&format!(
        "Tiempo de procesamiento: {:.2} segundos\n",
        answer.elapsed.as_secs_f64()
    ));

    if answer.consulted.is_empty() {
        out.push_str("Ningún extracto de los documentos coincide con la pregunta.\n");
        return out;
    }

    out.push_str("\nDocumentos consultados:\n");
    for document in &answer.consulted {
        out.push_str(&format!("=== Extractos de {} ===\n", document.name));
        for (position, excerpt) in document.excerpts.iter().enumerate() {
            out.push_str(&format!("Extracto {}:\n{}\n---\n", position + 1, excerpt));
        }
    }

    out
}

pub fn load_summary(corpus: &Corpus) -> String {
    let mut out = format!(
        "Todos los documentos han sido cargados correctamente en {:.2} segundos: {} documento(s), {} fragmento(s). ¡Ahora puede hacer sus preguntas!",
        corpus.load_time.as_secs_f64(),
        corpus.documents.len(),
        corpus.chunks.len()
    );

    if !corpus.skipped_files.is_empty() {
        out.push_str(&format!(
            "\nSe omitieron {} archivo(s) ilegible(s):",
            corpus.skipped_files.len()
        ));
        for skipped in &corpus.skipped_files {
            out.push_str(&format!("\n  {} ({})", skipped.path, skipped.reason));
        }
    }

    out
}

pub fn chunk_listing(report: &LoadReport, show_text: bool) -> String {
    let mut out = String::new();

    for document in &report.documents {
        let chunks = report
            .chunks
            .iter()
            .filter(|chunk| &chunk.document == document)
            .collect::<Vec<_>>();
        let tokens: usize = chunks.iter().map(|chunk| chunk.token_count).sum();
        let largest = chunks.iter().map(|chunk| chunk.token_count).max().unwrap_or(0);

        out.push_str(&format!(
            "{document}: fragmentos={} tokens={tokens} fragmento_mayor={largest}\n",
            chunks.len()
        ));

        if show_text {
            for chunk in chunks {
                out.push_str(&format!(
                    "  [#{} página {} tokens {}] {}\n",
                    chunk.index, chunk.page, chunk.token_count, chunk.text
                ));
            }
        }
    }

    for skipped in &report.skipped_files {
        out.push_str(&format!("omitido: {} ({})\n", skipped.path, skipped.reason));
    }

    out
}

pub fn load_failure(error: &LoadError) -> String {
    format!("Error al cargar los documentos: {error}")
}

pub fn connection_failure(error: &CompletionError) -> String {
    format!(
        "No se pudo inicializar el cliente de completions: {error}\n\
         Acciones requeridas:\n  \
         1. Verifique NVIDIA_API_KEY en el entorno o en el archivo .env\n  \
         2. Confirme que la cuenta tiene acceso al modelo\n  \
         3. Revise --base-url y la conectividad de red"
    )
}

pub fn query_failure(error: &QueryError) -> String {
    match error {
        QueryError::NotLoaded => LOAD_FIRST_NOTICE.to_string(),
        other => format!(
            "Error durante el procesamiento: {other}\n\
             Posibles soluciones:\n  \
             1. Verifique su conexión a internet\n  \
             2. Confirme el acceso al modelo\n  \
             3. Pruebe con una consulta más corta"
        ),
    }
}
