//! Tests for MCP server construction and metadata.

use std::io::Write;

use sundial::config::Config;
use sundial::mcp::SundialServer;

#[tokio::test]
async fn test_server_starts_without_credentials() {
    // No credentials configured: the server comes up degraded, not failing.
    let server = SundialServer::new(Config::default()).await;
    assert!(server.is_ok());
}

#[tokio::test]
async fn test_server_starts_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[calendar]\ncalendar_id = \"team@example.com\"\ndefault_offset = \"+02:00\"\n\n[llm]\nmodel = \"llama3.1\""
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.calendar.calendar_id, "team@example.com");

    let server = SundialServer::new(config).await;
    assert!(server.is_ok());
}

#[test]
fn test_env_overrides_apply_to_explicit_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[calendar]\ncalendar_id = \"from-file@example.com\"").unwrap();

    // An explicit config path must not bypass the environment.
    std::env::set_var("CALENDAR_ID", "from-env@example.com");
    let config = Config::from_file(file.path()).unwrap().with_env_overrides();
    std::env::remove_var("CALENDAR_ID");

    assert_eq!(config.calendar.calendar_id, "from-env@example.com");
}

#[tokio::test]
async fn test_server_info_names_the_tools() {
    use rmcp::ServerHandler;

    let server = SundialServer::new(Config::default()).await.unwrap();
    let info = server.get_info();

    assert!(
        !info.server_info.name.is_empty(),
        "Server should have a name"
    );
    assert!(info.capabilities.tools.is_some());

    let instructions = info.instructions.expect("Server should carry instructions");
    for tool in [
        "list_events_for_day",
        "is_free_at",
        "find_next_free_slot",
        "schedule_event",
        "update_event",
        "cancel_event",
    ] {
        assert!(
            instructions.contains(tool),
            "Instructions should mention {}",
            tool
        );
    }
}
