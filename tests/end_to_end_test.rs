use httpwatch::config::{HttpSource, RunConfig, WatchTarget};
use httpwatch::http::{Client, Status};
use httpwatch::parser::DslParser;
use httpwatch::runner::{Comparison, Outcome, Runner};
use httpwatch::session::Session;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(dir: &TempDir, source: HttpSource) -> RunConfig {
    RunConfig::new(WatchTarget::Folder(dir.path().to_path_buf()), source)
        .with_wait_time(Duration::from_millis(5))
        .with_request_timeout(Duration::from_secs(2))
}

/// 测试完整的 读取 → 解析 → 发送 → 比较 流程
#[tokio::test]
async fn test_http_file_end_to_end() {
    // 启动模拟服务器
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/comments/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 1,
            "body": "first"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/comments/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/comments"))
        .and(header("Content-Type", "application/json"))
        .and(body_string("{\"body\": \"hello\"}"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&mock_server)
        .await;

    // 创建临时 HTTP 文件
    let temp_dir = TempDir::new().unwrap();
    let http_file = temp_dir.path().join("comments.http");

    let content = format!(
        r#"
@baseURL = {}/v1

### Get Comment
GET {{{{baseURL}}}}/comments/1

### Missing
// @name missing comment
GET {{{{baseURL}}}}/comments/404
###
HTTP/1.1 404 Not Found

### Create
post {{{{baseURL}}}}/comments
Content-Type: application/json

{{"body": "hello"}}
###
HTTP/1.1 200 OK
"#,
        mock_server.uri()
    );
    fs::write(&http_file, content).unwrap();

    let config = config_for(&temp_dir, HttpSource::File(http_file));
    let client = Client::new(config.request_timeout).unwrap();
    let session = Session::new(config, temp_dir.path(), client);

    let records = session.run_once().await.unwrap();
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].label.as_deref(), Some("Get Comment"));
    assert_eq!(records[0].status(), Some(Status::new(200)));
    assert_eq!(records[0].comparison, Comparison::Unconstrained);

    assert_eq!(records[1].status(), Some(Status::new(404)));
    assert_eq!(records[1].comparison, Comparison::Matched);

    assert_eq!(records[2].status(), Some(Status::new(201)));
    assert_eq!(
        records[2].comparison,
        Comparison::Mismatch {
            expected: "200 OK".to_string(),
            got: "201 Created".to_string(),
        }
    );
}

/// 多行 URL 合并后的查询参数到达服务器
#[tokio::test]
async fn test_multiline_query_reaches_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .and(query_param("size", "10"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let content = format!("GET {}/search\n    ?page=2\n    &size=10\n", mock_server.uri());
    let files = vec![DslParser::parse_content(&content).unwrap()];

    let client = Client::new(Duration::from_secs(2)).unwrap();
    let runner = Runner::new(client, Duration::ZERO, Duration::from_secs(2));
    let records = runner.run(&files, |_| {}).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status(), Some(Status::new(200)));
}

/// 超时和连接失败不会中止后续请求
#[tokio::test]
async fn test_failures_are_isolated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let content = format!(
        "GET {uri}/slow\n###\nGET http://127.0.0.1:1/unreachable\n###\nGET {uri}/fast",
        uri = mock_server.uri()
    );
    let files = vec![DslParser::parse_content(&content).unwrap()];

    let client = Client::new(Duration::from_millis(200)).unwrap();
    let runner = Runner::new(client, Duration::ZERO, Duration::from_millis(200));
    let records = runner.run(&files, |_| {}).await;

    assert_eq!(records.len(), 3);
    assert!(matches!(records[0].outcome, Outcome::TransportFailed(_)));
    assert!(matches!(records[1].outcome, Outcome::TransportFailed(_)));
    assert_eq!(records[2].status(), Some(Status::new(200)));
}

/// @no-redirect 返回 3xx 本身
#[tokio::test]
async fn test_no_redirect_directive() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let content = format!(
        "GET {uri}/old\n###\n// @no-redirect\nGET {uri}/old",
        uri = mock_server.uri()
    );
    let files = vec![DslParser::parse_content(&content).unwrap()];

    let client = Client::new(Duration::from_secs(2)).unwrap();
    let runner = Runner::new(client, Duration::ZERO, Duration::from_secs(2));
    let records = runner.run(&files, |_| {}).await;

    assert_eq!(records[0].status(), Some(Status::new(200)));
    assert_eq!(records[1].status(), Some(Status::new(302)));
}

/// 目录中的文件按名称顺序执行
#[tokio::test]
async fn test_http_folder_runs_files_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("b.rest"),
        format!("GET {}/b", mock_server.uri()),
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("a.http"),
        format!("GET {}/a1\n###\nGET {}/a2", mock_server.uri(), mock_server.uri()),
    )
    .unwrap();

    let config = config_for(&temp_dir, HttpSource::Folder(temp_dir.path().to_path_buf()));
    let client = Client::new(config.request_timeout).unwrap();
    let session = Session::new(config, temp_dir.path(), client);

    let records = session.run_once().await.unwrap();
    let paths: Vec<String> = records
        .iter()
        .map(|r| r.url.rsplit('/').next().unwrap().to_string())
        .collect();
    assert_eq!(paths, vec!["a1", "a2", "b"]);

    let received = mock_server.received_requests().await.unwrap();
    let order: Vec<&str> = received.iter().map(|r| r.url.path()).collect();
    assert_eq!(order, vec!["/a1", "/a2", "/b"]);
}
