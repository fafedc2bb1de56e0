//! Template rendering over the embedded catalog.

use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, UndefinedBehavior};

use crate::domain::AppError;
use crate::services::assets;

const WORKFLOW_PREFIX: &str = "workflow/";

/// Minijinja environments preloaded with every embedded `.j2` template.
///
/// Workflow templates use `[% %]` / `[[[ ]]]` delimiters so GitHub Actions
/// `${{ ... }}` expressions pass through untouched; everything else uses the
/// default syntax, and `{% include %}` directives resolve the README
/// section partials. Undefined variables are strict errors: a context
/// missing a value a template needs fails the operation instead of
/// rendering a hole.
pub struct Renderer {
    env: Environment<'static>,
    workflow_env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, AppError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        let mut workflow_env = Environment::new();
        workflow_env.set_undefined_behavior(UndefinedBehavior::Strict);
        let syntax = SyntaxConfig::builder()
            .block_delimiters("[%", "%]")
            .variable_delimiters("[[[", "]]]")
            .comment_delimiters("[#", "#]")
            .build()
            .map_err(|err| AppError::render_error("workflow syntax", err))?;
        workflow_env.set_syntax(syntax);

        for (name, source) in assets::templates() {
            let target = if name.starts_with(WORKFLOW_PREFIX) { &mut workflow_env } else { &mut env };
            target.add_template(name, source).map_err(|err| AppError::render_error(name, err))?;
        }
        Ok(Self { env, workflow_env })
    }

    fn env_for(&self, name: &str) -> &Environment<'static> {
        if name.starts_with(WORKFLOW_PREFIX) { &self.workflow_env } else { &self.env }
    }

    /// Render an embedded template by its relative path.
    pub fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, AppError> {
        let template =
            self.env_for(name).get_template(name).map_err(|err| AppError::render_error(name, err))?;
        template.render(ctx).map_err(|err| AppError::render_error(name, err))
    }

    /// Render free-standing template text (the section-rewritten README)
    /// against the default environment.
    pub fn render_str(&self, text: &str, ctx: minijinja::Value) -> Result<String, AppError> {
        self.env.render_str(text, ctx).map_err(|err| AppError::render_error("<inline>", err))
    }
}

#[cfg(test)]
mod tests {
    use minijinja::context;

    use super::*;

    #[test]
    fn renders_codeowners_template() {
        let renderer = Renderer::new().unwrap();
        let output =
            renderer.render("misc/CODEOWNERS.j2", context! { owner => "acme" }).unwrap();
        assert!(output.contains("@acme"));
    }

    #[test]
    fn missing_template_is_an_error() {
        let renderer = Renderer::new().unwrap();
        let result = renderer.render("misc/NOPE.j2", context! {});
        assert!(matches!(result, Err(AppError::TemplateRender { .. })));
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let renderer = Renderer::new().unwrap();
        let result = renderer.render_str("{{ not_defined }}", context! {});
        assert!(matches!(result, Err(AppError::TemplateRender { .. })));
    }

    #[test]
    fn workflow_templates_keep_actions_expressions() {
        let renderer = Renderer::new().unwrap();
        let output = renderer
            .render(
                "workflow/lint-pr.yml.j2",
                context! { repository_name => "acme/widget" },
            )
            .unwrap();
        // GitHub Actions expressions survive rendering untouched.
        assert!(output.contains("${{ secrets.GITHUB_TOKEN }}"));
        assert!(output.contains("Validate PR title"));
    }

    #[test]
    fn inline_include_resolves_section_partial() {
        let renderer = Renderer::new().unwrap();
        let output = renderer
            .render_str(
                "{% include \"readme/section/header.md.j2\" %}",
                context! {
                    repository_title => "Widget",
                    repository_description => "A widget service.",
                    logo => false,
                },
            )
            .unwrap();
        assert!(output.contains("<!-- begin:header -->"));
        assert!(output.contains("<!-- end:header -->"));
        assert!(output.contains("Widget"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let renderer = Renderer::new().unwrap();
        let ctx = || context! { owner => "acme" };
        let first = renderer.render("misc/CODEOWNERS.j2", ctx()).unwrap();
        let second = renderer.render("misc/CODEOWNERS.j2", ctx()).unwrap();
        assert_eq!(first, second);
    }
}
