pub mod assets;
mod github;
mod memory;
mod renderer;

pub use github::{GitHubApiConfig, HttpGitHubProvider};
pub use memory::MemoryProvider;
pub use renderer::Renderer;
