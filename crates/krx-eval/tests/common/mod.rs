//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use krx_eval::{ConstrainedPrompt, EvalResult, Example, InferenceOracle, SamplingParams};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

type AnswerFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Deterministic oracle: the rationale depends only on the prompt, the forced
/// token comes from a caller-supplied function of the final prompt.
pub struct ScriptedOracle {
    answer_for: AnswerFn,
    /// Prompt count of every `generate` call
    pub generate_calls: Mutex<Vec<usize>>,
    /// Alphabet sizes of every `generate_constrained` call
    pub constrained_calls: Mutex<Vec<Vec<usize>>>,
}

impl ScriptedOracle {
    pub fn new(answer_for: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            answer_for: Box::new(answer_for),
            generate_calls: Mutex::new(Vec::new()),
            constrained_calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer `token` for the question whose text is `question`
    pub fn by_question(answers: &[(&str, &str)]) -> Self {
        let answers: Vec<(String, String)> = answers
            .iter()
            .map(|(q, a)| (format!("### 질문: {q}\n"), a.to_string()))
            .collect();
        Self::new(move |prompt| {
            answers
                .iter()
                .find(|(marker, _)| prompt.contains(marker.as_str()))
                .map(|(_, token)| token.clone())
                .unwrap_or_else(|| "A".to_string())
        })
    }

    /// Always answer `token`
    pub fn constant(token: &'static str) -> Self {
        Self::new(move |_| token.to_string())
    }
}

#[async_trait]
impl InferenceOracle for ScriptedOracle {
    async fn generate(
        &self,
        prompts: &[String],
        params: &SamplingParams,
    ) -> EvalResult<Vec<String>> {
        self.generate_calls.lock().unwrap().push(prompts.len());
        Ok(prompts
            .iter()
            .map(|p| format!(" 풀이: {}자, 최대 {}", p.chars().count(), params.max_tokens))
            .collect())
    }

    async fn generate_constrained(
        &self,
        requests: &[ConstrainedPrompt],
    ) -> EvalResult<Vec<String>> {
        self.constrained_calls
            .lock()
            .unwrap()
            .push(requests.iter().map(|r| r.alphabet.len()).collect());
        Ok(requests.iter().map(|r| (self.answer_for)(&r.prompt)).collect())
    }
}

/// Example with `n` labelled choices and the given answer
pub fn example(question: &str, n: usize, answer: &str) -> Example {
    let choices = krx_eval::mcqa::CHOICE_LABELS
        .iter()
        .cycle()
        .take(n)
        .enumerate()
        .map(|(i, label)| format!("{label}. 보기 {}", i + 1))
        .collect();
    Example::new(question, choices, answer)
}

/// Write examples as a JSONL dataset file
pub fn write_dataset(path: &Path, examples: &[Example]) {
    let lines: Vec<String> = examples
        .iter()
        .map(|e| serde_json::to_string(e).unwrap())
        .collect();
    std::fs::write(path, lines.join("\n") + "\n").unwrap();
}

type Handler = Arc<dyn Fn(&Value) -> (u16, Value) + Send + Sync>;

/// Minimal HTTP/1.1 server answering every request through `handler`.
///
/// Returns the base URL and the JSON bodies received so far.
pub async fn spawn_stub_server(
    handler: impl Fn(&Value) -> (u16, Value) + Send + Sync + 'static,
) -> (String, Arc<Mutex<Vec<Value>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let handler: Handler = Arc::new(handler);

    let seen = Arc::clone(&received);
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let handler = Arc::clone(&handler);
            let seen = Arc::clone(&seen);
            tokio::spawn(async move {
                serve_one(stream, handler, seen).await;
            });
        }
    });

    (format!("http://{addr}"), received)
}

async fn serve_one(mut stream: TcpStream, handler: Handler, seen: Arc<Mutex<Vec<Value>>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body: Value =
        serde_json::from_slice(&buf[header_end..header_end + content_length]).unwrap_or(Value::Null);
    seen.lock().unwrap().push(body.clone());

    let (status, response) = handler(&body);
    let payload = serde_json::to_vec(&response).unwrap();
    let head = format!(
        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        payload.len()
    );
    stream.write_all(head.as_bytes()).await.unwrap();
    stream.write_all(&payload).await.unwrap();
    stream.shutdown().await.ok();
}
