use crate::http::{BuildError, ParsedRequest, ParsedResponse};
use std::collections::HashMap;
use std::path::PathBuf;

/// 单个 HTTP 文件在一次解析中的完整状态
///
/// 每次解析（首次运行和每次重新加载）都会重新生成，不跨重新加载复用
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// 当前阶段的文本内容（注释、变量定义被移除后会更新）
    pub raw_content: String,

    /// 源文件路径
    pub file_path: PathBuf,

    /// `@name = value` 定义的全局变量
    pub global_variables: HashMap<String, String>,

    /// 按 ### 分割出的非空块
    pub blocks: Vec<Block>,
}

impl SourceFile {
    pub fn new(file_path: impl Into<PathBuf>, raw_content: impl Into<String>) -> Self {
        Self {
            raw_content: raw_content.into(),
            file_path: file_path.into(),
            global_variables: HashMap::new(),
            blocks: Vec::new(),
        }
    }

    /// 所有携带请求的块
    pub fn request_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.request.is_some())
    }
}

/// 两个 ### 分隔符之间的内容
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// 从 1 开始的序号
    pub id: usize,

    /// 块文本
    pub content: String,

    /// 分隔符行 ### 之后的文字
    pub label: Option<String>,

    /// 块开头保留的 `// @...` 指令
    pub directives: Vec<Directive>,

    /// 可发送的请求
    pub request: Option<ParsedRequest>,

    /// 请求构建失败的原因（与 request 互斥）
    pub build_error: Option<BuildError>,

    /// 紧随其后的响应块给出的期望响应
    pub expected_response: Option<ParsedResponse>,
}

impl Block {
    pub fn new(id: usize, content: impl Into<String>, label: Option<String>) -> Self {
        Self {
            id,
            content: content.into(),
            label,
            directives: Vec::new(),
            request: None,
            build_error: None,
            expected_response: None,
        }
    }

    /// 第一行（去除行尾 `\r`）
    pub fn first_line(&self) -> &str {
        self.content
            .split('\n')
            .next()
            .unwrap_or_default()
            .trim_end_matches('\r')
    }

    /// 显示用名称：分隔符标签优先，其次 `@name` 指令
    pub fn display_label(&self) -> Option<&str> {
        self.label.as_deref().or_else(|| {
            self.directives.iter().find_map(|d| match d {
                Directive::Name(name) => Some(name.as_str()),
                _ => None,
            })
        })
    }

    pub fn has_directive(&self, directive: &Directive) -> bool {
        self.directives.contains(directive)
    }
}

/// 注释剥离时保留的指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `// @name <text>`
    Name(String),
    /// `// @note <text>`
    Note(String),
    /// `// @prompt <var> [description]`
    Prompt {
        variable: String,
        description: Option<String>,
    },
    /// `// @no-redirect`
    NoRedirect,
    /// `// @no-cookie-jar`
    NoCookieJar,
}

impl Directive {
    /// 保留的指令前缀
    pub const PREFIXES: [&'static str; 5] = [
        "// @prompt",
        "// @name",
        "// @note",
        "// @no-redirect",
        "// @no-cookie-jar",
    ];

    /// 判断一行（去除前导空白后）是否以保留指令开头
    pub fn is_directive_line(line: &str) -> bool {
        let trimmed = line.trim_start();
        Self::PREFIXES.iter().any(|p| trimmed.starts_with(p))
    }

    /// 解析指令行，非指令行返回 None
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        let rest = trimmed.strip_prefix("// @")?;
        let (name, content) = match rest.split_once(char::is_whitespace) {
            Some((name, content)) => (name, content.trim()),
            None => (rest, ""),
        };

        match name {
            "name" => Some(Directive::Name(content.to_string())),
            "note" => Some(Directive::Note(content.to_string())),
            "prompt" => {
                let (variable, description) = match content.split_once(char::is_whitespace) {
                    Some((v, d)) => (v, Some(d.trim().to_string())),
                    None => (content, None),
                };
                Some(Directive::Prompt {
                    variable: variable.to_string(),
                    description,
                })
            }
            "no-redirect" => Some(Directive::NoRedirect),
            "no-cookie-jar" => Some(Directive::NoCookieJar),
            _ => None,
        }
    }
}

/// 解析错误类型
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 文件内容为空
    #[error("empty file content in {}", .path.display())]
    EmptyFile { path: PathBuf },

    /// 分割后没有任何非空块
    #[error("no valid blocks found in content of {}", .path.display())]
    NoBlocks { path: PathBuf },

    /// 期望响应块的状态行或 header 格式错误
    #[error("malformed response in {}, block {block}: {message}", .path.display())]
    MalformedResponse {
        path: PathBuf,
        block: usize,
        message: String,
    },
}

/// 解析结果类型别名
pub type ParseResult<T> = Result<T, ParseError>;
