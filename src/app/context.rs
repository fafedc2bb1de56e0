use crate::domain::Settings;
use crate::ports::GitHubProvider;
use crate::services::Renderer;

/// Application context holding dependencies for command execution.
pub struct AppContext<P: GitHubProvider> {
    provider: P,
    renderer: Renderer,
    settings: Settings,
}

impl<P: GitHubProvider> AppContext<P> {
    pub fn new(provider: P, renderer: Renderer, settings: Settings) -> Self {
        Self { provider, renderer, settings }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
