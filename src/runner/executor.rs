use crate::http::{ParsedRequest, Transport, TransportError};
use crate::parser::{Block, SourceFile};
use crate::runner::types::{Comparison, Outcome, RunRecord};
use std::time::{Duration, Instant};

/// 按文件、块的顺序逐个发送请求
pub struct Runner<T: Transport> {
    transport: T,
    wait_time: Duration,
    timeout: Duration,
}

impl<T: Transport> Runner<T> {
    pub fn new(transport: T, wait_time: Duration, timeout: Duration) -> Self {
        Self {
            transport,
            wait_time,
            timeout,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 执行所有文件中的请求
    ///
    /// 每完成一个块就调用 `on_record`；单个请求失败不会中止运行
    pub async fn run<F>(&self, files: &[SourceFile], mut on_record: F) -> Vec<RunRecord>
    where
        F: FnMut(&RunRecord) + Send,
    {
        let mut records = Vec::new();
        let mut sent_any = false;

        for file in files {
            for block in &file.blocks {
                let record = if let Some(request) = &block.request {
                    // 第一个请求之前不等待
                    if sent_any && !self.wait_time.is_zero() {
                        tokio::time::sleep(self.wait_time).await;
                    }
                    sent_any = true;
                    self.execute_one(file, block, request).await
                } else if let Some(err) = &block.build_error {
                    Self::build_failed(file, block, err.to_string())
                } else {
                    continue;
                };

                on_record(&record);
                records.push(record);
            }
        }

        records
    }

    /// 发送单个请求，超时只作用于这一个请求
    async fn execute_one(&self, file: &SourceFile, block: &Block, request: &ParsedRequest) -> RunRecord {
        tracing::debug!(
            "Sending block {} of {}: {} {}",
            block.id,
            file.file_path.display(),
            request.method,
            request.url
        );

        let start = Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        };
        let elapsed = start.elapsed();

        let (outcome, comparison) = match result {
            Ok(response) => {
                let comparison = Comparison::evaluate(block.expected_response.as_ref(), response.status);
                (Outcome::from_response(response), comparison)
            }
            Err(e) => {
                tracing::debug!("Request {} {} failed: {}", request.method, request.url, e);
                (Outcome::TransportFailed(e.to_string()), Comparison::Unconstrained)
            }
        };

        RunRecord {
            file: file.file_path.clone(),
            block_id: block.id,
            label: block.display_label().map(str::to_string),
            method: Some(request.method),
            url: request.url.clone(),
            outcome,
            elapsed,
            comparison,
            wire: Some(request.to_wire()),
        }
    }

    fn build_failed(file: &SourceFile, block: &Block, message: String) -> RunRecord {
        RunRecord {
            file: file.file_path.clone(),
            block_id: block.id,
            label: block.display_label().map(str::to_string),
            method: None,
            url: block.first_line().to_string(),
            outcome: Outcome::BuildFailed(message),
            elapsed: Duration::ZERO,
            comparison: Comparison::Unconstrained,
            wire: None,
        }
    }
}
