use clap::{ Parser, Subcommand };
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Scene Service Args ---
    /// Base URL of the scene generation service (e.g., http://127.0.0.1:8080)
    #[arg(long, env = "SCENEFLOW_API_URL", default_value = "http://127.0.0.1:8080", global = true)]
    pub api_base_url: String,

    /// How requests reach the service from this client (direct, proxy, same-origin)
    #[arg(long, env = "SCENEFLOW_CORS_MODE", default_value = "direct", global = true)]
    pub cors_mode: String,

    /// Proxy prefix used when --cors-mode=proxy (e.g., https://corsproxy.io/?)
    #[arg(long, env = "SCENEFLOW_CORS_PROXY", global = true)]
    pub cors_proxy: Option<String>,

    // --- Gallery Args ---
    /// Simulated delay in milliseconds for the gallery refresh action.
    #[arg(long, env = "SCENEFLOW_REFRESH_DELAY_MS", default_value = "1000", global = true)]
    pub refresh_delay_ms: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Interactive scene chat (default when no command is given).
    Chat,

    /// Generate a scene from a single description and print the result.
    Generate {
        /// Natural-language description of the room.
        description: String,
    },

    /// Print the stored turns of a conversation.
    History {
        conversation_id: String,
    },

    /// Probe the service liveness endpoint.
    Health,

    /// Ask the service for optimization suggestions on a scene JSON file.
    Optimize {
        scene_path: PathBuf,
    },

    /// List one page of the scene gallery.
    Gallery {
        /// 1-based page number.
        #[arg(long, default_value = "1")]
        page: usize,

        /// Run the refresh action before listing.
        #[arg(long)]
        refresh: bool,
    },

    /// Run the local mock scene service.
    ServeMock {
        /// Host address and port for the mock service to listen on.
        #[arg(long, env = "SCENEFLOW_MOCK_ADDR", default_value = "127.0.0.1:8080")]
        addr: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_interactive_chat() {
        let args = Args::try_parse_from(["sceneflow"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.cors_mode, "direct");
        assert_eq!(args.refresh_delay_ms, 1000);
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "sceneflow",
            "gallery",
            "--page",
            "2",
            "--api-base-url",
            "http://scenes.local:9000",
        ]).unwrap();
        assert_eq!(args.api_base_url, "http://scenes.local:9000");
        match args.command {
            Some(Command::Gallery { page, refresh }) => {
                assert_eq!(page, 2);
                assert!(!refresh);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
