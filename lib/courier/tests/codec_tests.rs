//! Content negotiation tests: built-in YAML/BSON codecs, sniffing and
//! client-registered codecs.

use assert2::{check, let_assert};
use bytes::Bytes;
use courier::prelude::*;
use courier::{CodecError, codec_fn};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_bytes, body_string, header, method, path},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Name {
    first: String,
    last: String,
}

fn harry() -> Name {
    Name {
        first: "Harry".to_string(),
        last: "Potter".to_string(),
    }
}

/// Comma-separated rows with a header line, as an array of objects.
fn csv_codec() -> impl courier::Codec {
    codec_fn(
        |value: &Value| {
            let rows = value
                .as_array()
                .ok_or_else(|| CodecError::new("csv needs a sequence of rows"))?;
            let Some(Value::Object(first)) = rows.first() else {
                return Ok(Bytes::new());
            };
            let columns: Vec<&String> = first.keys().collect();
            let mut out = columns
                .iter()
                .map(|column| column.as_str())
                .collect::<Vec<_>>()
                .join(",");
            out.push('\n');
            for row in rows {
                let cells: Vec<&str> = columns
                    .iter()
                    .map(|column| row.get(column.as_str()).and_then(Value::as_str).unwrap_or_default())
                    .collect();
                out.push_str(&cells.join(","));
                out.push('\n');
            }
            Ok(Bytes::from(out))
        },
        |bytes: &[u8]| {
            let text = std::str::from_utf8(bytes).map_err(CodecError::new)?;
            let mut lines = text.lines().filter(|line| !line.trim().is_empty());
            let header = lines.next().ok_or_else(|| CodecError::new("empty csv"))?;
            let columns: Vec<&str> = header.split(',').collect();
            if columns.len() < 2 {
                return Err(CodecError::new("not csv"));
            }
            let mut rows = Vec::new();
            for line in lines {
                let cells: Vec<&str> = line.split(',').collect();
                if cells.len() != columns.len() {
                    return Err(CodecError::new("ragged csv row"));
                }
                let row: serde_json::Map<String, Value> = columns
                    .iter()
                    .zip(cells)
                    .map(|(column, cell)| ((*column).to_string(), Value::from(cell)))
                    .collect();
                rows.push(Value::Object(row));
            }
            Ok(Value::Array(rows))
        },
    )
}

fn client(server: &MockServer) -> Client {
    Client::builder()
        .base_url(server.uri())
        .build()
        .expect("client")
}

#[tokio::test]
async fn yaml_round_trip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/names"))
        .and(header("Content-Type", "application/yaml"))
        .and(header("Accept", "application/yaml"))
        .and(body_string("first: Harry\nlast: Potter\n"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("first: Harry\nlast: Potter\n", "application/yaml"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let endpoint = Endpoint::post("/names")
        .send(ContentType::Yaml)
        .accept(ContentType::Yaml)
        .request_schema(TypedSchema::<Name>::new())
        .response_schema(TypedSchema::<Name>::new())
        .build()
        .expect("endpoint");
    let ctx = RequestContext::new().media(Media::serialize(&harry()).expect("media"));

    let name: Name = client(&mock_server).fetch(&endpoint, ctx).await.expect("name");

    check!(name == harry());
}

#[tokio::test]
async fn bson_round_trip() {
    let mock_server = MockServer::start().await;

    let sent = bson::to_vec(&bson::doc! {"first": "Harry", "last": "Potter"}).expect("bson");
    let received = bson::to_vec(&bson::doc! {"first": "Ginny", "last": "Weasley"}).expect("bson");

    Mock::given(method("PUT"))
        .and(path("/names/1"))
        .and(header("Content-Type", "application/bson"))
        .and(body_bytes(sent))
        .respond_with(ResponseTemplate::new(200).set_body_raw(received, "application/bson"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let endpoint = Endpoint::put("/names/{id}")
        .send(ContentType::Bson)
        .build()
        .expect("endpoint");
    let ctx = RequestContext::new()
        .path_param("id", 1)
        .media(Media::serialize(&harry()).expect("media"));

    let mut name = harry();
    client(&mock_server)
        .update(&endpoint, ctx, &mut name)
        .await
        .expect("update");

    check!(name.first == "Ginny");
    check!(name.last == "Weasley");
}

#[tokio::test]
async fn per_call_send_overrides_the_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/names"))
        .and(header("Content-Type", "application/yaml"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let endpoint = Endpoint::post("/names")
        .status(201)
        .send(ContentType::Json)
        .build()
        .expect("endpoint");
    let ctx = RequestContext::new()
        .media(json!({"first": "Harry"}))
        .send(ContentType::Yaml);

    let outcome = client(&mock_server).execute(&endpoint, ctx).await.expect("outcome");

    check!(outcome.status() == 201);
}

#[tokio::test]
async fn undeclared_response_is_sniffed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/names/1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes("first: Harry\nlast: Potter\n"))
        .mount(&mock_server)
        .await;

    let endpoint = Endpoint::get("/names/{id}").build().expect("endpoint");
    let ctx = RequestContext::new().path_param("id", 1);

    let name: Name = client(&mock_server).fetch(&endpoint, ctx).await.expect("name");

    check!(name == harry());
}

#[tokio::test]
async fn unknown_declared_content_type_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/names/1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("first=Harry", "application/x-www-form-urlencoded"))
        .mount(&mock_server)
        .await;

    let endpoint = Endpoint::get("/names/{id}").build().expect("endpoint");
    let ctx = RequestContext::new().path_param("id", 1);

    let result = client(&mock_server).execute(&endpoint, ctx).await;

    let_assert!(Err(Error::ContentTypeUnknown(content_type)) = result);
    check!(content_type == "application/x-www-form-urlencoded");
}

#[tokio::test]
async fn malformed_declared_body_is_a_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/names/1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{not json", "application/json"))
        .mount(&mock_server)
        .await;

    let endpoint = Endpoint::get("/names/{id}").build().expect("endpoint");
    let ctx = RequestContext::new().path_param("id", 1);

    let result = client(&mock_server).execute(&endpoint, ctx).await;

    let_assert!(Err(Error::ContentDecode { content_type, .. }) = result);
    check!(content_type.as_deref() == Some("application/json"));
}

#[tokio::test]
async fn custom_csv_codec_sends_and_sniffs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/names"))
        .and(header("Content-Type", "text/csv"))
        .and(body_string("first,last\nHarry,Potter\n"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes("first,last\nHarry,Potter\nRon,Weasley\n"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .codec_before(ContentType::Text, "text/csv", csv_codec())
        .expect("text codec registered")
        .build()
        .expect("client");

    let endpoint = Endpoint::post("/names").send("text/csv").build().expect("endpoint");
    let ctx = RequestContext::new().media(json!([{"first": "Harry", "last": "Potter"}]));

    let names: Vec<Name> = client.fetch(&endpoint, ctx).await.expect("names");

    check!(names.len() == 2);
    check!(names.last().map(|name| name.last.as_str()) == Some("Weasley"));
}

#[tokio::test]
async fn unregistered_send_type_fails_before_sending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let endpoint = Endpoint::post("/names").send("text/csv").build().expect("endpoint");
    let ctx = RequestContext::new().media(json!([{"first": "Harry"}]));

    let result = client(&mock_server).execute(&endpoint, ctx).await;

    let_assert!(Err(Error::ContentTypeUnknown(content_type)) = result);
    check!(content_type == "text/csv");
}

#[tokio::test]
async fn plain_text_falls_back_to_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/motto"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Draco dormiens nunquam titillandus"))
        .mount(&mock_server)
        .await;

    let endpoint = Endpoint::get("/motto").build().expect("endpoint");

    let motto: String = client(&mock_server)
        .fetch(&endpoint, RequestContext::new())
        .await
        .expect("motto");

    check!(motto == "Draco dormiens nunquam titillandus");
}
