//! Pages command handler

use super::{load_generator_config, reporter};
use crate::commands::PagesArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::render_page;
use planwright::{FsWorkspace, ObjectLibrary, PageObjectDefinition, Workspace};
use std::sync::Arc;

/// Execute the pages command
pub fn execute_pages(config: &CliConfig, args: &PagesArgs) -> CliResult<()> {
    let generator_config = load_generator_config(config)?;
    let workspace: Arc<dyn Workspace> = Arc::new(FsWorkspace::from_config(&args.root, &generator_config));
    let library = ObjectLibrary::new(workspace, &generator_config);
    let out = reporter(config);

    match &args.name {
        Some(name) => {
            let def = find_page(&library, name)?;
            if args.json {
                out.print(&format!("{}\n", serde_json::to_string_pretty(&def)?));
            } else {
                out.print(&render_page(&def));
            }
        }
        None => {
            let pages = library.discover()?;
            if args.json {
                out.print(&format!("{}\n", serde_json::to_string_pretty(&pages)?));
            } else if pages.is_empty() {
                out.info("library is empty");
            } else {
                for def in &pages {
                    out.print(&format!(
                        "{:<28} {:>3} locators {:>3} methods\n",
                        def.name(),
                        def.locator_count(),
                        def.method_count()
                    ));
                }
            }
        }
    }
    Ok(())
}

/// A stored page; absent pages are an error rather than an empty definition
pub fn find_page(library: &ObjectLibrary, name: &str) -> CliResult<PageObjectDefinition> {
    if !library.workspace().list_pages()?.iter().any(|p| p == name) {
        return Err(CliError::PageNotFound {
            name: name.to_string(),
        });
    }
    let mut resolved = library.resolve(&[name.to_string()])?;
    resolved
        .shift_remove(name)
        .ok_or_else(|| CliError::PageNotFound {
            name: name.to_string(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use planwright::{GeneratorConfig, Locator, Strategy};
    use tempfile::TempDir;

    fn seeded() -> (TempDir, ObjectLibrary) {
        let dir = TempDir::new().unwrap();
        let ws: Arc<dyn Workspace> = Arc::new(FsWorkspace::new(dir.path()));
        let library = ObjectLibrary::new(ws, &GeneratorConfig::default());
        library
            .extend("LoginPage", &[Locator::new("loginButton", Strategy::role("button", "Login"))], &[])
            .unwrap();
        library.persist().unwrap();
        (dir, library)
    }

    #[test]
    fn test_find_stored_page() {
        let (_dir, library) = seeded();
        let def = find_page(&library, "LoginPage").unwrap();
        assert_eq!(def.locator_count(), 1);
    }

    #[test]
    fn test_unknown_page() {
        let (_dir, library) = seeded();
        let err = find_page(&library, "CartPage").unwrap_err();
        assert!(matches!(err, CliError::PageNotFound { name } if name == "CartPage"));
    }

    #[test]
    fn test_execute_lists_and_shows() {
        let (dir, _library) = seeded();
        let config = CliConfig::new().with_verbosity(crate::config::Verbosity::Quiet);
        let mut args = PagesArgs {
            name: None,
            root: dir.path().to_path_buf(),
            json: false,
        };
        execute_pages(&config, &args).unwrap();
        args.name = Some("LoginPage".to_string());
        args.json = true;
        execute_pages(&config, &args).unwrap();
        args.name = Some("Nope".to_string());
        assert!(execute_pages(&config, &args).is_err());
    }
}
