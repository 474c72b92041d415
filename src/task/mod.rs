//! Task definitions: markdown files with YAML frontmatter.
//!
//! A task file declares what the agent should do (`description`), which
//! files it needs to see (`context`, `repo`), which environment variables
//! must be set (`environment`), and what it promises to produce
//! (`outputs`, `guarantees`). The markdown body after the frontmatter
//! carries free-form instructions.

mod loader;
mod spec;

pub use loader::load;
pub use spec::TaskSpec;
