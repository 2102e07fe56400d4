//! MCP protocol tests: JSON-RPC dispatch and the stdio loop.

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pubmed_mcp::client::PubMedClient;
use pubmed_mcp::config::Config;
use pubmed_mcp::server::McpServer;
use pubmed_mcp::server::stdio::run_stdio;
use pubmed_mcp::server::transport::{JsonRpcRequest, error_codes};

/// Create a server whose client points at the mock server.
fn setup_test_server(mock_server: &MockServer) -> McpServer {
    let config = Config::for_testing(&mock_server.uri());
    McpServer::new(PubMedClient::new(config).unwrap())
}

fn request(value: Value) -> JsonRpcRequest {
    JsonRpcRequest::parse(&value.to_string()).unwrap()
}

#[tokio::test]
async fn test_initialize_echoes_protocol_version() {
    let mock_server = MockServer::start().await;
    let server = setup_test_server(&mock_server);

    let response = server
        .handle_request(request(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {"protocolVersion": "2025-03-26", "capabilities": {}}
        })))
        .await
        .unwrap();

    let result = response.result.unwrap();
    assert_eq!(response.id, Some(json!(1)));
    assert_eq!(result["protocolVersion"], "2025-03-26");
    assert_eq!(result["serverInfo"]["name"], "pubmed-mcp");
    assert!(result["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn test_initialize_defaults_protocol_version() {
    let mock_server = MockServer::start().await;
    let server = setup_test_server(&mock_server);

    let response = server
        .handle_request(request(json!({"jsonrpc": "2.0", "id": "a", "method": "initialize"})))
        .await
        .unwrap();

    assert_eq!(response.result.unwrap()["protocolVersion"], "2024-11-05");
}

#[tokio::test]
async fn test_tools_list_has_all_tools() {
    let mock_server = MockServer::start().await;
    let server = setup_test_server(&mock_server);

    let response = server
        .handle_request(request(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})))
        .await
        .unwrap();

    let result = response.result.unwrap();
    let tools = result["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 11);

    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    for expected in [
        "pubmed_search",
        "pubmed_batch_search",
        "pubmed_author_search",
        "pubmed_journal_search",
        "pubmed_advanced_search",
        "pubmed_similar",
        "pubmed_cites",
        "pubmed_cited_by",
        "pubmed_abstract",
        "pubmed_open_access",
        "pubmed_full_text",
    ] {
        assert!(names.contains(&expected), "missing tool {expected}");
    }

    for tool in tools {
        assert_eq!(tool["inputSchema"]["type"], "object");
        assert!(!tool["description"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_unknown_method() {
    let mock_server = MockServer::start().await;
    let server = setup_test_server(&mock_server);

    let response = server
        .handle_request(request(json!({"jsonrpc": "2.0", "id": 3, "method": "resources/list"})))
        .await
        .unwrap();

    let error = response.error.unwrap();
    assert_eq!(error.code, error_codes::METHOD_NOT_FOUND);
    assert!(response.result.is_none());
}

#[tokio::test]
async fn test_unknown_tool_is_invalid_params() {
    let mock_server = MockServer::start().await;
    let server = setup_test_server(&mock_server);

    let response = server
        .handle_request(request(json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": {"name": "pubmed_nope", "arguments": {}}
        })))
        .await
        .unwrap();

    assert_eq!(response.error.unwrap().code, error_codes::INVALID_PARAMS);
}

#[tokio::test]
async fn test_notification_gets_no_response() {
    let mock_server = MockServer::start().await;
    let server = setup_test_server(&mock_server);

    let response = server
        .handle_request(request(
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        ))
        .await;

    assert!(response.is_none());
}

#[tokio::test]
async fn test_tool_failure_is_error_result() {
    let mock_server = MockServer::start().await;
    let server = setup_test_server(&mock_server);

    let response = server
        .handle_request(request(json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": {"name": "pubmed_search", "arguments": {"query": "   "}}
        })))
        .await
        .unwrap();

    assert!(response.error.is_none());
    let result = response.result.unwrap();
    assert_eq!(result["isError"], true);
    assert_eq!(result["content"][0]["type"], "text");
    assert!(result["content"][0]["text"].as_str().unwrap().contains("query"));
}

#[tokio::test]
async fn test_tool_call_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/entrez/eutils/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "esearchresult": {"count": "0", "idlist": []}
        })))
        .mount(&mock_server)
        .await;
    let server = setup_test_server(&mock_server);

    let response = server
        .handle_request(request(json!({
            "jsonrpc": "2.0",
            "id": 6,
            "method": "tools/call",
            "params": {"name": "pubmed_search", "arguments": {"query": "nothing"}}
        })))
        .await
        .unwrap();

    let result = response.result.unwrap();
    assert!(result.get("isError").is_none());
    let text: Value = serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(text["count"], 0);
}

#[test]
fn test_parse_rejects_bad_json_and_non_requests() {
    let err = JsonRpcRequest::parse("{not json").unwrap_err();
    assert_eq!(err.error.unwrap().code, error_codes::PARSE_ERROR);
    assert!(err.id.is_none());

    let err = JsonRpcRequest::parse(r#"{"jsonrpc": "2.0", "id": 9}"#).unwrap_err();
    assert_eq!(err.error.unwrap().code, error_codes::INVALID_REQUEST);
    assert_eq!(err.id, Some(json!(9)));
}

#[tokio::test]
async fn test_stdio_loop_answers_requests_only() {
    let mock_server = MockServer::start().await;
    let server = setup_test_server(&mock_server);

    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        "\n",
        "garbage\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
        "\n",
    );
    let mut output = Vec::new();

    run_stdio(&server, input.as_bytes(), &mut output).await.unwrap();

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["id"], 1);
    assert!(lines[0]["result"]["protocolVersion"].is_string());
    assert_eq!(lines[1]["error"]["code"], error_codes::PARSE_ERROR);
    assert!(lines[1]["id"].is_null());
    assert_eq!(lines[2]["id"], 2);
    assert_eq!(lines[2]["result"], json!({}));
}
