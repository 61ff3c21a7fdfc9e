use anyhow::Result;

/// Seam to the external LLM. The real network-backed implementation lives
/// outside this core; [`EchoResponder`] stands in when no credential is
/// configured.
pub trait Responder {
    fn respond(&self, prompt: &str) -> Result<String>;
}

/// No-credential fallback: echoes the prompt back.
#[derive(Debug, Default)]
pub struct EchoResponder;

impl Responder for EchoResponder {
    fn respond(&self, prompt: &str) -> Result<String> {
        Ok(format!("[echo] {prompt}"))
    }
}

/// Compose the final prompt: the user's question followed by the dashboard
/// context paragraph as reference data.
pub fn compose_prompt(question: &str, context: &str) -> String {
    format!(
        "[user question]\n{question}\n\n[reference data]\n{context}\n\n---\n\
         Answer the question using the reference data above, citing its \
         concrete figures where relevant."
    )
}

/// Ask the responder, degrading failures to a displayable message. External
/// call errors never propagate past this point.
pub fn answer(responder: &dyn Responder, question: &str, context: &str) -> String {
    let prompt = compose_prompt(question, context);
    match responder.respond(&prompt) {
        Ok(text) => text,
        Err(err) => {
            log::error!("responder failed: {err:#}");
            format!("[error] {err}")
        }
    }
}
