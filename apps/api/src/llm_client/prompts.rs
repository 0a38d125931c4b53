// Cross-cutting prompt helpers shared by the rule-based and free-form pipelines.
// Each pipeline keeps its own prompt text in a prompts.rs alongside it.

/// Appended to a user prompt when the provider can only be asked for "a JSON
/// object" and the response contract has to travel in the prompt itself.
pub const JSON_SCHEMA_INSTRUCTION: &str = "Use the following JSON schema to generate the response. \
    Respond with a single JSON object only, with no text outside it:";

/// Fills `{name}` placeholders in one pass.
///
/// Substituted values are never rescanned, so a resume that happens to contain
/// `{job_description}` is copied verbatim. Unknown placeholders are left as-is.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
