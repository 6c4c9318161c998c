//! String template rendering utilities.
//!
//! Placeholders use the `{{name}}` form.

pub struct TemplateVars;

impl TemplateVars {
    pub const PROGRAM: &'static str = "program";
    pub const VERSION: &'static str = "version";
    pub const DATE: &'static str = "date";
}

pub fn render(template: &str, variables: &[(&str, &str)]) -> String {
    let mut result = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    result
}

pub fn is_present(template: &str, key: &str) -> bool {
    let placeholder = format!("{{{{{}}}}}", key);
    template.contains(&placeholder)
}
