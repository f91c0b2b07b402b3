use crate::parser::types::{ParseResult, SourceFile};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

fn definition_regex() -> &'static Regex {
    static DEF_REGEX: OnceLock<Regex> = OnceLock::new();
    DEF_REGEX.get_or_init(|| Regex::new(r"^\s*@(\w+)\s*=\s*(.+?)\s*$").unwrap())
}

fn placeholder_regex() -> &'static Regex {
    static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
    VAR_REGEX.get_or_init(|| Regex::new(r"\{\{([^}]+)\}\}").unwrap())
}

/// 第 2 步：提取 `@name = value` 全局变量并替换 `{{name}}`
pub fn resolve_variables(mut file: SourceFile) -> ParseResult<SourceFile> {
    let (content, globals) = extract_definitions(&file.raw_content);
    file.raw_content = VariableResolver::substitute(&content, &globals);
    file.global_variables = globals;
    Ok(file)
}

/// 移除变量定义行并返回变量表，后定义的同名变量覆盖先定义的
pub fn extract_definitions(content: &str) -> (String, HashMap<String, String>) {
    let re = definition_regex();
    let mut globals = HashMap::new();
    let mut kept = Vec::new();

    for line in content.split('\n') {
        // 定义行可能带 `\r`
        match re.captures(line.trim_end_matches('\r')) {
            Some(caps) => {
                globals.insert(caps[1].to_string(), caps[2].to_string());
            }
            None => kept.push(line),
        }
    }

    (kept.join("\n"), globals)
}

/// 变量替换器
pub struct VariableResolver;

impl VariableResolver {
    /// 单次替换文本中的所有 `{{variable}}` 占位符
    ///
    /// `{{name/}}` 找不到时去掉末尾 `/` 再查找；仍找不到则原样保留。
    /// 替换结果不会再次扫描
    pub fn substitute(text: &str, globals: &HashMap<String, String>) -> String {
        placeholder_regex()
            .replace_all(text, |caps: &Captures| {
                let inner = caps[1].trim();
                if let Some(value) = globals.get(inner) {
                    return value.clone();
                }
                if let Some(stripped) = inner.strip_suffix('/')
                    && let Some(value) = globals.get(stripped)
                {
                    return value.clone();
                }
                caps[0].to_string()
            })
            .into_owned()
    }
}
