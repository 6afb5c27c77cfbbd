//! Built-in MathML to OMML mapping.
//!
//! Covers the presentation elements the LaTeX converter emits. N-ary
//! operators (`∫`, `∑`, ...) take the element that follows them as their
//! body, which is why grouping the integrand matters.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{OmmlTransform, TransformError, OMML_NAMESPACE};

const NARY_OPERATORS: &[&str] = &[
    "∫", "∬", "∭", "∮", "∯", "∰", "∑", "∏", "∐", "⋃", "⋂", "⋁", "⋀", "⨁", "⨂", "⨀",
];

const INTEGRAL_OPERATORS: &[&str] = &["∫", "∬", "∭", "∮", "∯", "∰"];

const ACCENTS: &[&str] = &[
    "^", "ˆ", "~", "˜", "˙", "¨", "→", "⃗", "´", "`", "˘", "ˇ", "̂", "̃", "̇",
];

const BARS: &[&str] = &["¯", "‾", "_", "̲", "―"];

/// MathML to OMML transform implemented in Rust.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTransform;

impl NativeTransform {
    /// Create a new native transform.
    pub fn new() -> Self {
        Self
    }
}

impl OmmlTransform for NativeTransform {
    fn name(&self) -> &str {
        "native"
    }

    fn transform(&self, mathml: &str) -> Result<String, TransformError> {
        let root = parse(mathml)?;
        let math = root
            .children
            .iter()
            .find(|n| n.name == "math")
            .ok_or_else(|| TransformError::Failed("no <math> element".to_string()))?;

        let mut out = String::with_capacity(mathml.len() * 2);
        out.push_str("<m:oMath xmlns:m=\"");
        out.push_str(OMML_NAMESPACE);
        out.push_str("\">");
        render_seq(&math.children, &mut out)?;
        out.push_str("</m:oMath>");
        Ok(out)
    }
}

/// Parsed MathML element.
#[derive(Debug, Default)]
struct Node {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
    text: String,
}

impl Node {
    fn from_start(e: &BytesStart<'_>) -> Result<Self, TransformError> {
        let mut attrs = Vec::new();
        for attr in e.attributes().flatten() {
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value().map_err(failed)?.into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
            attrs,
            ..Self::default()
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn child(&self, index: usize) -> Result<&Node, TransformError> {
        self.children.get(index).ok_or_else(|| {
            TransformError::Failed(format!("<{}> is missing argument {}", self.name, index + 1))
        })
    }

    fn token(&self) -> &str {
        self.text.trim()
    }

    fn is_operator(&self, set: &[&str]) -> bool {
        self.name == "mo" && set.contains(&self.token())
    }
}

fn failed(err: impl std::fmt::Display) -> TransformError {
    TransformError::Failed(err.to_string())
}

fn parse(mathml: &str) -> Result<Node, TransformError> {
    let mut reader = Reader::from_str(mathml);
    reader.config_mut().trim_text(true);

    let mut stack = vec![Node::default()];
    loop {
        match reader.read_event().map_err(failed)? {
            Event::Start(e) => stack.push(Node::from_start(&e)?),
            Event::Empty(e) => {
                let node = Node::from_start(&e)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::End(_) => {
                let node = stack.pop().filter(|_| !stack.is_empty()).ok_or_else(|| {
                    TransformError::Failed("unbalanced MathML".to_string())
                })?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(failed)?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(c.as_ref()).into_owned();
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(root), true) => Ok(root),
        _ => Err(TransformError::Failed("unclosed MathML element".to_string())),
    }
}

/// Render siblings, letting n-ary operators absorb their body.
fn render_seq(nodes: &[Node], out: &mut String) -> Result<(), TransformError> {
    let mut i = 0;
    while i < nodes.len() {
        if let Some(nary) = Nary::from_node(&nodes[i]) {
            let body = nodes.get(i + 1).filter(|n| n.name != "mo");
            nary.render(body, out)?;
            i += if body.is_some() { 2 } else { 1 };
            continue;
        }
        render_node(&nodes[i], out)?;
        i += 1;
    }
    Ok(())
}

/// Render a script or argument, flattening a wrapping `<mrow>`.
fn render_arg(node: &Node, out: &mut String) -> Result<(), TransformError> {
    if node.name == "mrow" {
        render_seq(&node.children, out)
    } else {
        render_seq(std::slice::from_ref(node), out)
    }
}

fn wrap(
    tag: &str,
    out: &mut String,
    inner: impl FnOnce(&mut String) -> Result<(), TransformError>,
) -> Result<(), TransformError> {
    out.push_str("<m:");
    out.push_str(tag);
    out.push('>');
    inner(out)?;
    out.push_str("</m:");
    out.push_str(tag);
    out.push('>');
    Ok(())
}

fn render_node(node: &Node, out: &mut String) -> Result<(), TransformError> {
    match node.name.as_str() {
        "mi" => {
            let style = match node.attr("mathvariant") {
                Some("normal") => Some("p"),
                Some("bold") => Some("b"),
                Some("bold-italic") => Some("bi"),
                _ if node.token().chars().count() > 1 => Some("p"),
                _ => None,
            };
            render_run(node.token(), style, false, out);
        }
        "mn" | "mo" => render_run(node.token(), None, false, out),
        "mtext" | "ms" => render_run(&node.text, None, true, out),
        "mspace" | "annotation" | "annotation-xml" | "none" | "mprescripts" => {}
        "merror" => return Err(TransformError::Failed("MathML contains <merror>".to_string())),
        "msup" => wrap("sSup", out, |out| {
            wrap("e", out, |out| render_arg(node.child(0)?, out))?;
            wrap("sup", out, |out| render_arg(node.child(1)?, out))
        })?,
        "msub" => wrap("sSub", out, |out| {
            wrap("e", out, |out| render_arg(node.child(0)?, out))?;
            wrap("sub", out, |out| render_arg(node.child(1)?, out))
        })?,
        "msubsup" => wrap("sSubSup", out, |out| {
            wrap("e", out, |out| render_arg(node.child(0)?, out))?;
            wrap("sub", out, |out| render_arg(node.child(1)?, out))?;
            wrap("sup", out, |out| render_arg(node.child(2)?, out))
        })?,
        "mfrac" => wrap("f", out, |out| {
            if matches!(node.attr("linethickness"), Some("0" | "0pt" | "0em" | "0px")) {
                out.push_str("<m:fPr><m:type m:val=\"noBar\"/></m:fPr>");
            }
            wrap("num", out, |out| render_arg(node.child(0)?, out))?;
            wrap("den", out, |out| render_arg(node.child(1)?, out))
        })?,
        "msqrt" => wrap("rad", out, |out| {
            out.push_str("<m:radPr><m:degHide m:val=\"1\"/></m:radPr><m:deg/>");
            wrap("e", out, |out| render_seq(&node.children, out))
        })?,
        "mroot" => wrap("rad", out, |out| {
            wrap("deg", out, |out| render_arg(node.child(1)?, out))?;
            wrap("e", out, |out| render_arg(node.child(0)?, out))
        })?,
        "mover" => render_over(node, out)?,
        "munder" => render_under(node, out)?,
        "munderover" => wrap("limUpp", out, |out| {
            wrap("e", out, |out| {
                wrap("limLow", out, |out| {
                    wrap("e", out, |out| render_arg(node.child(0)?, out))?;
                    wrap("lim", out, |out| render_arg(node.child(1)?, out))
                })
            })?;
            wrap("lim", out, |out| render_arg(node.child(2)?, out))
        })?,
        "mfenced" => render_fenced(node, out)?,
        "menclose" => wrap("borderBox", out, |out| {
            wrap("e", out, |out| render_seq(&node.children, out))
        })?,
        "mtable" => wrap("m", out, |out| {
            for row in node
                .children
                .iter()
                .filter(|r| r.name == "mtr" || r.name == "mlabeledtr")
            {
                wrap("mr", out, |out| {
                    for cell in row.children.iter().filter(|c| c.name == "mtd") {
                        wrap("e", out, |out| render_seq(&cell.children, out))?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })?,
        // mrow, mstyle, mpadded, mphantom, semantics and unknown containers
        _ => render_seq(&node.children, out)?,
    }
    Ok(())
}

fn render_run(text: &str, style: Option<&str>, normal_text: bool, out: &mut String) {
    if text.is_empty() {
        return;
    }
    out.push_str("<m:r>");
    if normal_text {
        out.push_str("<m:rPr><m:nor/></m:rPr>");
    } else if let Some(style) = style {
        out.push_str("<m:rPr><m:sty m:val=\"");
        out.push_str(style);
        out.push_str("\"/></m:rPr>");
    }
    if text.starts_with(' ') || text.ends_with(' ') {
        out.push_str("<m:t xml:space=\"preserve\">");
    } else {
        out.push_str("<m:t>");
    }
    out.push_str(&escape(text));
    out.push_str("</m:t></m:r>");
}

fn render_over(node: &Node, out: &mut String) -> Result<(), TransformError> {
    let over = node.child(1)?;
    if over.is_operator(BARS) {
        return render_bar(node.child(0)?, "top", out);
    }
    if over.is_operator(ACCENTS) || (over.name == "mo" && node.attr("accent") == Some("true")) {
        return wrap("acc", out, |out| {
            out.push_str("<m:accPr><m:chr m:val=\"");
            out.push_str(&escape(over.token()));
            out.push_str("\"/></m:accPr>");
            wrap("e", out, |out| render_arg(node.child(0)?, out))
        });
    }
    wrap("limUpp", out, |out| {
        wrap("e", out, |out| render_arg(node.child(0)?, out))?;
        wrap("lim", out, |out| render_arg(over, out))
    })
}

fn render_under(node: &Node, out: &mut String) -> Result<(), TransformError> {
    let under = node.child(1)?;
    if under.is_operator(BARS) {
        return render_bar(node.child(0)?, "bot", out);
    }
    wrap("limLow", out, |out| {
        wrap("e", out, |out| render_arg(node.child(0)?, out))?;
        wrap("lim", out, |out| render_arg(under, out))
    })
}

fn render_bar(base: &Node, position: &str, out: &mut String) -> Result<(), TransformError> {
    wrap("bar", out, |out| {
        out.push_str("<m:barPr><m:pos m:val=\"");
        out.push_str(position);
        out.push_str("\"/></m:barPr>");
        wrap("e", out, |out| render_arg(base, out))
    })
}

fn render_fenced(node: &Node, out: &mut String) -> Result<(), TransformError> {
    let open = node.attr("open").unwrap_or("(");
    let close = node.attr("close").unwrap_or(")");
    wrap("d", out, |out| {
        out.push_str("<m:dPr><m:begChr m:val=\"");
        out.push_str(&escape(open));
        out.push_str("\"/><m:endChr m:val=\"");
        out.push_str(&escape(close));
        out.push_str("\"/></m:dPr>");
        if node.children.is_empty() {
            out.push_str("<m:e/>");
        }
        for child in &node.children {
            wrap("e", out, |out| render_arg(child, out))?;
        }
        Ok(())
    })
}

/// N-ary operator with optional limits.
struct Nary<'a> {
    chr: &'a str,
    sub: Option<&'a Node>,
    sup: Option<&'a Node>,
    under_over: bool,
}

impl<'a> Nary<'a> {
    fn from_node(node: &'a Node) -> Option<Self> {
        if node.is_operator(NARY_OPERATORS) {
            return Some(Self::bare(node.token()));
        }

        let base = node.children.first()?;
        if !base.is_operator(NARY_OPERATORS) {
            return None;
        }
        let mut nary = Self::bare(base.token());
        let first = node.children.get(1);
        let second = node.children.get(2);
        match node.name.as_str() {
            "msub" | "munder" => nary.sub = first,
            "msup" | "mover" => nary.sup = first,
            "msubsup" | "munderover" => {
                nary.sub = first;
                nary.sup = second;
            }
            _ => return None,
        }
        nary.under_over = node.name.starts_with("mu") || node.name == "mover";
        Some(nary)
    }

    fn bare(chr: &'a str) -> Self {
        Self {
            chr,
            sub: None,
            sup: None,
            under_over: !INTEGRAL_OPERATORS.contains(&chr),
        }
    }

    fn render(&self, body: Option<&Node>, out: &mut String) -> Result<(), TransformError> {
        wrap("nary", out, |out| {
            out.push_str("<m:naryPr><m:chr m:val=\"");
            out.push_str(&escape(self.chr));
            out.push_str("\"/><m:limLoc m:val=\"");
            out.push_str(if self.under_over { "undOvr" } else { "subSup" });
            out.push_str("\"/>");
            if self.sub.is_none() {
                out.push_str("<m:subHide m:val=\"1\"/>");
            }
            if self.sup.is_none() {
                out.push_str("<m:supHide m:val=\"1\"/>");
            }
            out.push_str("</m:naryPr>");

            wrap("sub", out, |out| self.sub.map_or(Ok(()), |n| render_arg(n, out)))?;
            wrap("sup", out, |out| self.sup.map_or(Ok(()), |n| render_arg(n, out)))?;
            wrap("e", out, |out| body.map_or(Ok(()), |n| render_arg(n, out)))
        })
    }
}
