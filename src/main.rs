mod app;
mod config;
mod io;
mod state;
mod store;
mod validate;

use app::QuickmarkApp;
use config::Config;
use eframe::egui;
use io::LocalIconStore;
use state::BookmarkDraft;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use store::{BookmarkStore, FileStore};

/// How the editor was invoked: bookmark a new page, or edit a stored one.
#[derive(Debug, PartialEq)]
enum Invocation {
    New {
        url: Option<String>,
        title: Option<String>,
        icon: Option<String>,
    },
    Edit(i64),
}

fn parse_args(args: &[String]) -> Result<Invocation, String> {
    let mut url = None;
    let mut title = None;
    let mut icon = None;
    let mut edit = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--edit" => {
                let value = iter.next().ok_or("--edit needs a bookmark id")?;
                edit = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| format!("bad bookmark id: {}", value))?,
                );
            }
            "--icon" => {
                icon = Some(iter.next().ok_or("--icon needs a URL")?.clone());
            }
            "--help" | "-h" => {
                return Err("usage: quickmark [--edit ID] [--icon URL] [URL [TITLE]]".to_string())
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown option: {}", other));
            }
            positional => {
                if url.is_none() {
                    url = Some(positional.to_string());
                } else if title.is_none() {
                    title = Some(positional.to_string());
                } else {
                    return Err(format!("unexpected argument: {}", positional));
                }
            }
        }
    }

    match edit {
        Some(id) => Ok(Invocation::Edit(id)),
        None => Ok(Invocation::New { url, title, icon }),
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let config = Config::load();

    let args: Vec<String> = env::args().skip(1).collect();
    let invocation = match parse_args(&args) {
        Ok(inv) => inv,
        Err(msg) => {
            eprintln!("{}", msg);
            std::process::exit(2);
        }
    };

    let data_dir = config.data_dir().unwrap_or_else(|| PathBuf::from("."));
    let store: Arc<dyn BookmarkStore> = match FileStore::open(&data_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("could not open bookmark store in {}: {}", data_dir.display(), e);
            std::process::exit(1);
        }
    };
    let icons = Arc::new(LocalIconStore::new(data_dir.join("icons")));

    let draft = match invocation {
        Invocation::New { url, title, icon } => {
            let mut draft =
                BookmarkDraft::new_page(title.unwrap_or_default(), url.unwrap_or_default());
            draft.touch_icon_url = icon;
            draft
        }
        Invocation::Edit(id) => match store.bookmark(id) {
            Ok(record) => BookmarkDraft::edit(&record),
            Err(e) => {
                eprintln!("cannot edit bookmark {}: {}", id, e);
                std::process::exit(1);
            }
        },
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_title("Quickmark"),
        ..Default::default()
    };

    eframe::run_native(
        "Quickmark",
        options,
        Box::new(move |cc| {
            Ok(Box::new(QuickmarkApp::new(
                cc, config, store, icons, draft,
            )))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_new_page_invocation() {
        let inv = parse_args(&args(&["http://example.com", "Example"])).unwrap();
        assert_eq!(
            inv,
            Invocation::New {
                url: Some("http://example.com".to_string()),
                title: Some("Example".to_string()),
                icon: None,
            }
        );
    }

    #[test]
    fn test_parse_edit_invocation() {
        let inv = parse_args(&args(&["--edit", "42"])).unwrap();
        assert_eq!(inv, Invocation::Edit(42));
    }

    #[test]
    fn test_parse_rejects_bad_id_and_unknown_flags() {
        assert!(parse_args(&args(&["--edit", "x"])).is_err());
        assert!(parse_args(&args(&["--frobnicate"])).is_err());
        assert!(parse_args(&args(&["a", "b", "c"])).is_err());
    }
}
