use crate::http::{Method, ParsedResponse, Response, Status};
use std::path::PathBuf;
use std::time::Duration;

/// 单个块的执行记录
#[derive(Debug, Clone)]
pub struct RunRecord {
    /// 所属文件
    pub file: PathBuf,

    /// 块序号（从 1 开始）
    pub block_id: usize,

    /// 分隔符标签或 `@name`
    pub label: Option<String>,

    /// HTTP 方法（构建失败时为 None）
    pub method: Option<Method>,

    /// 请求 URL
    pub url: String,

    pub outcome: Outcome,

    /// 发送耗时，未发送时为零
    pub elapsed: Duration,

    pub comparison: Comparison,

    /// 实际发送的请求文本，构建失败时为 None
    pub wire: Option<String>,
}

impl RunRecord {
    pub fn status(&self) -> Option<Status> {
        match &self.outcome {
            Outcome::Responded { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// 请求的结果：观察到的状态或错误
#[derive(Debug, Clone)]
pub enum Outcome {
    /// 收到响应
    Responded { status: Status, body: String },

    /// 网络错误或超时
    TransportFailed(String),

    /// 块内容无法构建为请求，未发送
    BuildFailed(String),
}

impl Outcome {
    pub fn from_response(response: Response) -> Self {
        Outcome::Responded {
            status: response.status,
            body: response.body,
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Outcome::Responded { .. })
    }
}

/// 与期望响应的比较结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// 没有期望状态
    Unconstrained,
    Matched,
    Mismatch { expected: String, got: String },
}

impl Comparison {
    /// 只比较状态行（`"404 Not Found"`），headers 和 body 不参与
    ///
    /// 观察到的原因短语只能取标准短语；没有标准短语的状态码只比较数字
    pub fn evaluate(expected: Option<&ParsedResponse>, observed: Status) -> Self {
        let Some(expected) = expected.filter(|e| !e.status_text.is_empty()) else {
            return Comparison::Unconstrained;
        };

        let matched = if observed.reason_phrase().is_empty() {
            expected.status_code == observed.code()
        } else {
            expected.status() == observed.status_line()
        };

        let expected = expected.status();
        let got = observed.status_line();
        if matched {
            Comparison::Matched
        } else {
            Comparison::Mismatch { expected, got }
        }
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, Comparison::Mismatch { .. })
    }
}

/// 一次运行的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// 记录总数
    pub total: usize,
    /// 实际发出并收到响应的请求数
    pub sent: usize,
    /// 构建失败或发送失败
    pub failed: usize,
    /// 状态不符合期望
    pub mismatched: usize,
    pub total_duration: Duration,
}

impl RunSummary {
    pub fn from_records(records: &[RunRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Default::default()
        };

        for record in records {
            if record.outcome.is_failure() {
                summary.failed += 1;
            } else {
                summary.sent += 1;
            }
            if record.comparison.is_mismatch() {
                summary.mismatched += 1;
            }
            summary.total_duration += record.elapsed;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(code: u16, text: &str) -> ParsedResponse {
        ParsedResponse {
            protocol: "HTTP/1.1".to_string(),
            status_code: code,
            status_text: text.to_string(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    fn record(outcome: Outcome, comparison: Comparison) -> RunRecord {
        RunRecord {
            file: PathBuf::from("a.http"),
            block_id: 1,
            label: None,
            method: Some(Method::Get),
            url: "http://localhost/".to_string(),
            outcome,
            elapsed: Duration::from_millis(5),
            comparison,
            wire: None,
        }
    }

    #[test]
    fn test_comparison_matches_full_status() {
        let exp = expected(404, "Not Found");
        assert_eq!(
            Comparison::evaluate(Some(&exp), Status::new(404)),
            Comparison::Matched
        );
        assert_eq!(
            Comparison::evaluate(Some(&exp), Status::new(200)),
            Comparison::Mismatch {
                expected: "404 Not Found".to_string(),
                got: "200 OK".to_string(),
            }
        );
    }

    #[test]
    fn test_comparison_requires_matching_text() {
        let exp = expected(404, "Missing");
        assert!(Comparison::evaluate(Some(&exp), Status::new(404)).is_mismatch());
    }

    #[test]
    fn test_uncatalogued_code_compares_number_only() {
        assert_eq!(
            Comparison::evaluate(Some(&expected(599, "Custom")), Status::new(599)),
            Comparison::Matched
        );
        assert_eq!(
            Comparison::evaluate(Some(&expected(599, "Custom")), Status::new(598)),
            Comparison::Mismatch {
                expected: "599 Custom".to_string(),
                got: "598".to_string(),
            }
        );
        // 有标准短语时自定义短语无法匹配
        assert!(Comparison::evaluate(Some(&expected(404, "Nope")), Status::new(404)).is_mismatch());
    }

    #[test]
    fn test_comparison_without_expectation() {
        assert_eq!(
            Comparison::evaluate(None, Status::new(500)),
            Comparison::Unconstrained
        );
        let exp = expected(200, "");
        assert_eq!(
            Comparison::evaluate(Some(&exp), Status::new(500)),
            Comparison::Unconstrained
        );
    }

    #[test]
    fn test_summary_counts() {
        let records = vec![
            record(
                Outcome::Responded {
                    status: Status::new(200),
                    body: String::new(),
                },
                Comparison::Unconstrained,
            ),
            record(
                Outcome::Responded {
                    status: Status::new(200),
                    body: String::new(),
                },
                Comparison::Mismatch {
                    expected: "404 Not Found".to_string(),
                    got: "200 OK".to_string(),
                },
            ),
            record(
                Outcome::TransportFailed("connection refused".to_string()),
                Comparison::Unconstrained,
            ),
        ];

        let summary = RunSummary::from_records(&records);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.sent, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.mismatched, 1);
        assert_eq!(summary.total_duration, Duration::from_millis(15));
        assert_eq!(records[0].status(), Some(Status::new(200)));
        assert_eq!(records[2].status(), None);
    }
}
