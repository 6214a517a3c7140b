use crate::completion::{ChatMessage, CompletionRequest};
use crate::models::CompletionOptions;

pub const PROMPT_TEMPLATE: &str = r#"
Eres un asistente especializado en retail mexicano. Basado en la consulta sobre "{question}", 
analiza cuidadosamente los siguientes extractos de documentos comerciales para proporcionar 
una respuesta completa y precisa.

Instrucciones específicas:
1. Responde en español claro y profesional
2. Utiliza información de TODOS los documentos relevantes proporcionados
3. Especial atención a:
   - Disponibilidad y precios (catálogos)
   - Políticas de devolución y garantías
   - Procesos de pedidos y seguimiento
   - Términos y condiciones comerciales
4. Cita específicamente de qué documento proviene cada parte de tu respuesta
5. Si hay información conflictiva entre documentos, menciona ambas versiones

Extractos de los documentos:
{context}

Pregunta: {question}

Respuesta (basada en documentos comerciales):
"#;

pub const CONNECTION_PROBE: &str = "test connection";
pub const CONNECTION_PROBE_MAX_TOKENS: u32 = 100;

pub fn render_prompt(context: &str, question: &str) -> String {
    let mut rendered = String::with_capacity(PROMPT_TEMPLATE.len() + context.len() + question.len() * 2);
    let mut rest = PROMPT_TEMPLATE;

    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{context}") {
            rendered.push_str(context);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{question}") {
            rendered.push_str(question);
            rest = after;
        } else {
            rendered.push('{');
            rest = &tail[1..];
        }
    }

    rendered.push_str(rest);
    rendered
}

pub fn answer_request(options: &CompletionOptions, context: &str, question: &str) -> CompletionRequest {
    CompletionRequest::from_options(
        options,
        vec![
            ChatMessage::system(&options.system_directive),
            ChatMessage::user(render_prompt(context, question)),
        ],
    )
}

pub fn probe_request(options: &CompletionOptions) -> CompletionRequest {
    let mut request = CompletionRequest::from_options(
        options,
        vec![
            ChatMessage::system(&options.system_directive),
            ChatMessage::user(CONNECTION_PROBE),
        ],
    );
    request.max_tokens = CONNECTION_PROBE_MAX_TOKENS;
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::Role;

    #[test]
    fn placeholders_are_substituted() {
        let prompt = render_prompt("[Document: a.pdf]\nPrecio 10", "¿precio?");
        assert!(prompt.contains("Extractos de los documentos:\n[Document: a.pdf]\nPrecio 10\n"));
        assert!(prompt.contains("Pregunta: ¿precio?"));
        assert!(prompt.contains("consulta sobre \"¿precio?\""));
        assert!(!prompt.contains("{context}"));
        assert!(!prompt.contains("{question}"));
    }

    #[test]
    fn instructions_keep_their_fixed_wording() {
        let prompt = render_prompt("ctx", "garantia");
        assert!(prompt.contains("\n3. Especial atención a:\n"));
        assert!(prompt.contains(
            "\n4. Cita específicamente de qué documento proviene cada parte de tu respuesta\n"
        ));
        assert!(prompt.contains(
            "\n5. Si hay información conflictiva entre documentos, menciona ambas versiones\n"
        ));
        assert!(prompt.ends_with("Respuesta (basada en documentos comerciales):\n"));
    }

    #[test]
    fn placeholder_text_inside_context_is_left_alone() {
        let prompt = render_prompt("ver {question} en tabla {1}", "garantia");
        assert!(prompt.contains("ver {question} en tabla {1}"));
    }

    #[test]
    fn answer_request_starts_with_the_system_directive() {
        let options = CompletionOptions::default();
        let request = answer_request(&options, "ctx", "pregunta");

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, "/think");
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(request.max_tokens, 4_000);
        assert!(!request.stream);
    }

    #[test]
    fn probe_request_is_small() {
        let request = probe_request(&CompletionOptions::default());
        assert_eq!(request.max_tokens, CONNECTION_PROBE_MAX_TOKENS);
        assert_eq!(request.messages[1].content, CONNECTION_PROBE);
    }
}
