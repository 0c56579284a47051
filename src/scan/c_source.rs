//! Line-oriented C source summary: function, struct, global and define
//! tables plus the per-file inputs / outputs derived from them.
//!
//! This is pattern matching, not parsing. Anything that looks like
//! `type name(params) {` is a function, including `else if (x) {`, and
//! every `type name;` line counts as a global. The tables are what the
//! visualizer's input and output views are built from, so their quirks are
//! kept as-is.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+(?:\s+\w+)*)\s+(\w+)\s*\(([^)]*)\)\s*\{").expect("valid regex")
});

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\w+(?:\s+\w+)*)\s+(\w+)(?:\[(\d+)\])?;").expect("valid regex")
});

static CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\w+)\s*\(").expect("valid regex"));

static STRUCT_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*struct\s+(\w+)\s*\{").expect("valid regex"));

static STRUCT_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\}\s*;").expect("valid regex"));

static GLOBAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(extern|static)?\s*(\w+(?:\s+\w+)*)\s+(\w+)(?:\[(\d+)\])?;").expect("valid regex")
});

static DEFINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#define\s+(\w+)\s+(.+)").expect("valid regex"));

static INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"#include\s+[<"](.+?)[>"]"#).expect("valid regex"));

static CONTROL_FLOW: LazyLock<[(ControlKeyword, Regex); 4]> = LazyLock::new(|| {
    [
        (ControlKeyword::If, r"\bif\b"),
        (ControlKeyword::Else, r"\belse\b"),
        (ControlKeyword::For, r"\bfor\b"),
        (ControlKeyword::While, r"\bwhile\b"),
    ]
    .map(|(keyword, pattern)| (keyword, Regex::new(pattern).expect("valid regex")))
});

const MANY_FUNCTIONS: usize = 20;
const HIGH_COMPLEXITY: usize = 15;
const MANY_GLOBALS: usize = 10;

/// Everything extracted from one file's text. Serializes into the `content`
/// block of a structure document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CSource {
    pub functions: Vec<Function>,
    pub structs: Vec<StructDef>,
    pub globals: Vec<Global>,
    pub defines: Vec<Define>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Function {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    pub start_line: usize,
    pub end_line: usize,
    pub local_variables: Vec<Declaration>,
    pub function_calls: Vec<Call>,
    pub control_flow: Vec<ControlFlow>,
    pub complexity: usize,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
}

/// A `type name;` or `type name[N];` line, inside a function or a struct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Declaration {
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    pub array_size: Option<String>,
    pub line_number: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Call {
    pub name: String,
    pub line_number: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ControlKeyword {
    If,
    Else,
    For,
    While,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControlFlow {
    #[serde(rename = "type")]
    pub keyword: ControlKeyword,
    pub line_number: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub members: Vec<Declaration>,
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Global {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub storage_class: Option<String>,
    pub array_size: Option<String>,
    pub line_number: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Define {
    pub name: String,
    pub value: String,
    pub line_number: usize,
}

impl CSource {
    pub fn parse(text: &str) -> Self {
        Self {
            functions: parse_functions(text),
            structs: parse_structs(text),
            globals: parse_globals(text),
            defines: parse_defines(text),
        }
    }

    /// Distinct parameter names over every function: the file's inputs.
    pub fn parameter_names(&self) -> BTreeSet<String> {
        self.functions
            .iter()
            .flat_map(|f| f.parameters.iter().map(|p| p.name.clone()))
            .collect()
    }

    /// Distinct non-`void` return types: the file's outputs.
    pub fn return_types(&self) -> BTreeSet<String> {
        self.functions
            .iter()
            .filter(|f| f.return_type != "void")
            .map(|f| f.return_type.clone())
            .collect()
    }

    pub fn optimization_opportunities(&self) -> Vec<String> {
        let mut found = Vec::new();
        if self.functions.len() > MANY_FUNCTIONS {
            found.push("High number of functions".to_string());
        }
        if self.functions.iter().any(|f| f.complexity > HIGH_COMPLEXITY) {
            found.push("Functions with high cyclomatic complexity".to_string());
        }
        if self.globals.len() > MANY_GLOBALS {
            found.push("High number of global variables".to_string());
        }
        found
    }
}

/// Distinct `#include` targets, brackets and quotes stripped.
pub fn includes(text: &str) -> BTreeSet<String> {
    INCLUDE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim_matches(|c| matches!(c, '"' | '<' | '>')).to_string())
        .collect()
}

fn parse_functions(text: &str) -> Vec<Function> {
    FUNCTION
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let return_type = caps.get(1)?.as_str().to_string();
            let name = caps.get(2)?.as_str().to_string();
            let parameters = parse_parameters(caps.get(3).map_or("", |m| m.as_str()));
            let start_line = text[..whole.start()].matches('\n').count() + 1;
            Some(function_body(
                name,
                return_type,
                parameters,
                start_line,
                &text[whole.end()..],
            ))
        })
        .collect()
}

/// Scan forward from the opening brace until braces balance, collecting
/// locals, calls and control flow along the way.
fn function_body(
    name: String,
    return_type: String,
    parameters: Vec<Parameter>,
    start_line: usize,
    rest: &str,
) -> Function {
    let lines: Vec<&str> = rest.split('\n').collect();
    let mut depth: i64 = 1;
    let mut end_line = start_line;
    let mut local_variables = Vec::new();
    let mut function_calls = Vec::new();
    let mut control_flow = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let line_number = start_line + i + 1;
        end_line += 1;
        depth += line.matches('{').count() as i64 - line.matches('}').count() as i64;

        if let Some(decl) = declaration(line, line_number) {
            local_variables.push(decl);
        }
        function_calls.extend(CALL.captures_iter(line).filter_map(|c| c.get(1)).map(|m| Call {
            name: m.as_str().to_string(),
            line_number,
        }));
        if let Some((keyword, _)) = CONTROL_FLOW.iter().find(|(_, re)| re.is_match(line)) {
            control_flow.push(ControlFlow {
                keyword: *keyword,
                line_number,
            });
        }

        if depth == 0 {
            break;
        }
    }

    let body = &lines[..(end_line - start_line).min(lines.len())];
    let inputs = parameters.iter().map(|p| p.name.clone()).collect();
    let outputs = if return_type == "void" {
        Vec::new()
    } else {
        vec![return_type.clone()]
    };
    let dependencies = function_calls
        .iter()
        .map(|c| c.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    Function {
        name,
        return_type,
        parameters,
        start_line,
        end_line,
        local_variables,
        function_calls,
        control_flow,
        complexity: complexity(body),
        inputs,
        outputs,
        dependencies,
    }
}

/// One plus the number of lines opening with a branch or a boolean join.
fn complexity(body: &[&str]) -> usize {
    1 + body
        .iter()
        .map(|line| line.trim())
        .filter(|line| {
            ["if", "for", "while", "&&", "||"]
                .iter()
                .any(|prefix| line.starts_with(prefix))
        })
        .count()
}

/// `char **argv` is type `char`, name `**argv`: the last word is the name.
fn parse_parameters(list: &str) -> Vec<Parameter> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(|p| {
            let words: Vec<&str> = p.split_whitespace().collect();
            let (name, type_words) = words.split_last()?;
            Some(Parameter {
                type_name: type_words.join(" "),
                name: name.to_string(),
            })
        })
        .collect()
}

fn declaration(line: &str, line_number: usize) -> Option<Declaration> {
    let caps = DECLARATION.captures(line)?;
    Some(Declaration {
        type_name: caps.get(1)?.as_str().to_string(),
        name: caps.get(2)?.as_str().to_string(),
        array_size: caps.get(3).map(|m| m.as_str().to_string()),
        line_number,
    })
}

fn parse_structs(text: &str) -> Vec<StructDef> {
    let mut structs = Vec::new();
    let mut current: Option<StructDef> = None;

    for (i, line) in text.split('\n').enumerate() {
        let line_number = i + 1;
        if let Some(caps) = STRUCT_START.captures(line) {
            current = Some(StructDef {
                name: caps[1].to_string(),
                members: Vec::new(),
                start_line: line_number,
                end_line: line_number,
            });
        } else if let Some(mut def) = current.take() {
            if STRUCT_END.is_match(line) {
                def.end_line = line_number;
                structs.push(def);
            } else {
                def.members.extend(declaration(line, line_number));
                current = Some(def);
            }
        }
    }
    structs
}

fn parse_globals(text: &str) -> Vec<Global> {
    text.split('\n')
        .enumerate()
        .filter(|(_, line)| !line.trim().starts_with('#'))
        .filter_map(|(i, line)| {
            let caps = GLOBAL.captures(line)?;
            Some(Global {
                name: caps.get(3)?.as_str().to_string(),
                type_name: caps.get(2)?.as_str().to_string(),
                storage_class: caps.get(1).map(|m| m.as_str().to_string()),
                array_size: caps.get(4).map(|m| m.as_str().to_string()),
                line_number: i + 1,
            })
        })
        .collect()
}

fn parse_defines(text: &str) -> Vec<Define> {
    text.split('\n')
        .enumerate()
        .filter_map(|(i, line)| {
            let caps = DEFINE.captures(line)?;
            Some(Define {
                name: caps[1].to_string(),
                value: caps[2].trim().to_string(),
                line_number: i + 1,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED: &str = "\
#include \"doomtype.h\"
#define FRACBITS 16

struct vertex_s {
    int x;
    int y;
};

static int numvertexes;

int FixedMul(int a, int b)
{
    long long c;
    if (a < 0)
        c = -a;
    return c >> FRACBITS;
}

void I_Error(char *error)
{
    exit(1);
}
";

    #[test]
    fn test_function_signature_and_body() {
        let parsed = CSource::parse(FIXED);
        let names: Vec<_> = parsed.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["FixedMul", "I_Error"]);

        let mul = &parsed.functions[0];
        assert_eq!(mul.return_type, "int");
        assert_eq!(
            mul.parameters,
            vec![
                Parameter {
                    type_name: "int".into(),
                    name: "a".into()
                },
                Parameter {
                    type_name: "int".into(),
                    name: "b".into()
                },
            ]
        );
        assert_eq!(mul.start_line, 11);
        assert_eq!(mul.end_line, 17);
        assert_eq!(mul.local_variables[0].type_name, "long long");
        assert_eq!(mul.local_variables[0].name, "c");
        assert_eq!(mul.control_flow[0].keyword, ControlKeyword::If);
        assert_eq!(mul.complexity, 2);
        assert_eq!(mul.inputs, vec!["a", "b"]);
        assert_eq!(mul.outputs, vec!["int"]);
        assert_eq!(mul.dependencies, vec!["if"]);

        let error = &parsed.functions[1];
        assert!(error.outputs.is_empty());
        assert_eq!(error.parameters[0].name, "*error");
        assert_eq!(error.dependencies, vec!["exit"]);
    }

    #[test]
    fn test_file_inputs_and_outputs() {
        let parsed = CSource::parse(FIXED);
        assert_eq!(
            parsed.parameter_names().into_iter().collect::<Vec<_>>(),
            vec!["*error", "a", "b"]
        );
        assert_eq!(
            parsed.return_types().into_iter().collect::<Vec<_>>(),
            vec!["int"]
        );
    }

    #[test]
    fn test_structs_globals_defines() {
        let parsed = CSource::parse(FIXED);

        assert_eq!(parsed.structs.len(), 1);
        let vertex = &parsed.structs[0];
        assert_eq!(vertex.name, "vertex_s");
        assert_eq!((vertex.start_line, vertex.end_line), (4, 7));
        let members: Vec<_> = vertex.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(members, vec!["x", "y"]);

        let numvertexes = parsed
            .globals
            .iter()
            .find(|g| g.name == "numvertexes")
            .unwrap();
        assert_eq!(numvertexes.storage_class.as_deref(), Some("static"));
        assert_eq!(numvertexes.type_name, "int");
        assert_eq!(numvertexes.line_number, 9);

        assert_eq!(
            parsed.defines,
            vec![Define {
                name: "FRACBITS".into(),
                value: "16".into(),
                line_number: 2
            }]
        );
    }

    #[test]
    fn test_array_declarations() {
        let parsed = CSource::parse("char buffer[256];\n");
        assert_eq!(parsed.globals[0].array_size.as_deref(), Some("256"));
        assert_eq!(parsed.globals[0].storage_class, None);
    }

    #[test]
    fn test_includes_are_distinct() {
        let text = "#include <stdio.h>\n#include \"doomdef.h\"\n#include \"doomdef.h\"\n";
        assert_eq!(
            includes(text).into_iter().collect::<Vec<_>>(),
            vec!["doomdef.h", "stdio.h"]
        );
    }

    #[test]
    fn test_optimization_opportunities() {
        assert!(CSource::parse(FIXED).optimization_opportunities().is_empty());

        let many: String = (0..11).map(|i| format!("int g{};\n", i)).collect();
        assert_eq!(
            CSource::parse(&many).optimization_opportunities(),
            vec!["High number of global variables"]
        );
    }

    #[test]
    fn test_serializes_with_generator_field_names() {
        let value = serde_json::to_value(CSource::parse(FIXED)).unwrap();
        assert_eq!(value["functions"][0]["parameters"][0]["type"], "int");
        assert_eq!(value["functions"][0]["control_flow"][0]["type"], "if");
        assert_eq!(value["globals"][0]["array_size"], serde_json::Value::Null);
    }
}
