//! String template rendering utilities.

pub struct TemplateVars;

impl TemplateVars {
    pub const TEST_DIR: &'static str = "test_dir";
    pub const PYTHON_VERSION: &'static str = "python_version";
    pub const TENANT_URL: &'static str = "tenant_url";
}

/// Replace every `{{key}}` placeholder with its value.
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
