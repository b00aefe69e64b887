//! Html dom abstraction, with runtime typing.

//! Nodes are allocated in a per-request `HtmlAllocator` and referred
//! to via `AId` handles; the allocator refuses to hand out more than
//! `max_allocations` nodes, so a single request can't build an
//! unbounded tree.

use std::{cell::RefCell,
          fmt::Debug,
          io::Write,
          marker::PhantomData};

use anyhow::{Result, bail};
use kstring::KString;

use crate::html::meta::*;
use crate::myfrom::MyFrom;

const DOCTYPE: &str = "<!DOCTYPE html>\n";

fn ks<T>(s: T) -> KString
where KString: MyFrom<T>
{
    KString::myfrom(s)
}

pub fn att<T, U>(key: T, val: U) -> Option<(KString, KString)>
    where KString: MyFrom<T> + MyFrom<U>
{
    Some((ks(key), ks(val)))
}

pub fn opt_att<T, U>(key: T, val: Option<U>) -> Option<(KString, KString)>
    where KString: MyFrom<T> + MyFrom<U>
{
    val.map(|val| (ks(key), ks(val)))
}

// once again
fn all_whitespace(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_whitespace())
}

#[derive(Debug)]
pub struct Element {
    meta: &'static ElementMeta,
    attr: Vec<(KString, KString)>,
    body: Vec<AId<Node>>,
}

#[derive(Debug)]
pub enum Node {
    Element(Element),
    String(KString),
    None,
}

pub struct AId<T> {
    t: PhantomData<fn() -> T>,
    id: u32,
}

impl<T> AId<T> {
    fn new(id: u32) -> AId<T> {
        AId { t: PhantomData, id }
    }
}

// derive is broken when using PhantomData, so do it manually:
impl<T> Clone for AId<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for AId<T> {}

impl<T> PartialEq for AId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl<T> Eq for AId<T> {}

impl<T> Debug for AId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AId({})", self.id)
    }
}

pub struct HtmlAllocator {
    nodes: RefCell<Vec<Node>>,
    max_allocations: u32,
    verify: bool,
}

impl HtmlAllocator {
    pub fn new(max_allocations: u32) -> Self {
        Self::new_with_verify(max_allocations, true)
    }

    pub fn new_with_verify(max_allocations: u32, verify: bool) -> Self {
        HtmlAllocator {
            nodes: RefCell::new(Vec::new()),
            max_allocations,
            verify,
        }
    }

    /// Number of nodes allocated so far.
    pub fn allocations(&self) -> u32 {
        self.nodes.borrow().len() as u32
    }

    fn allocate(&self, node: Node) -> Result<AId<Node>> {
        let mut nodes = self.nodes.borrow_mut();
        let id_ = nodes.len();
        if id_ >= self.max_allocations as usize {
            bail!("HtmlAllocator: out of memory (max_allocations = {})",
                  self.max_allocations)
        }
        nodes.push(node);
        Ok(AId::new(id_ as u32))
    }

    fn verify_element(
        &self,
        meta: &'static ElementMeta,
        attr: &[(KString, KString)],
        body: &[AId<Node>]
    ) -> Result<()> {
        for (i, (key, _)) in attr.iter().enumerate() {
            if ! meta.allows_attribute(key) {
                bail!("invalid attribute #{i} {:?} for element {:?}",
                      key.as_str(), meta.tag_name)
            }
        }
        if ! meta.has_closing_tag && ! body.is_empty() {
            bail!("element {:?} is a void element, can't have a body", meta.tag_name)
        }
        let nodes = self.nodes.borrow();
        for (i, id) in body.iter().enumerate() {
            match nodes.get(id.id as usize) {
                Some(Node::String(s)) =>
                    if (! meta.allows_child_text) && (! all_whitespace(s)) {
                        bail!("content value #{i}: text is not allowed as \
                               a child of element {:?}", meta.tag_name)
                    },
                Some(_) => (),
                None => bail!("content value #{i}: {id:?} was not allocated here"),
            }
        }
        Ok(())
    }

    /// Create an element from arrays or vectors of attributes and
    /// child nodes. `None` attributes (from `opt_att`) are dropped.
    pub fn element(
        &self,
        meta: &'static ElementMeta,
        attr: impl IntoIterator<Item = Option<(KString, KString)>>,
        body: impl IntoIterator<Item = AId<Node>>
    ) -> Result<AId<Node>>
    {
        let attr: Vec<_> = attr.into_iter().flatten().collect();
        let body: Vec<_> = body.into_iter().collect();
        if self.verify {
            self.verify_element(meta, &attr, &body)?;
        }
        self.allocate(Node::Element(Element { meta, attr, body }))
    }

    pub fn empty_node(&self) -> Result<AId<Node>> {
        self.allocate(Node::None)
    }

    pub fn staticstr(
        &self,
        s: &'static str
    ) -> Result<AId<Node>>
    {
        self.allocate(Node::String(KString::from_static(s)))
    }

    pub fn str(
        &self,
        s: &str
    ) -> Result<AId<Node>>
    {
        self.allocate(Node::String(KString::from_ref(s)))
    }

    pub fn string(
        &self,
        s: String
    ) -> Result<AId<Node>>
    {
        self.allocate(Node::String(KString::from_string(s)))
    }

    pub fn print_html_fragment(&self, id: AId<Node>, out: &mut impl Write) -> Result<()> {
        let nodes = self.nodes.borrow();
        print_node(&nodes, id, out)
    }

    pub fn print_html_document(&self, id: AId<Node>, out: &mut impl Write) -> Result<()> {
        out.write_all(DOCTYPE.as_bytes())?;
        self.print_html_fragment(id, out)
    }

    pub fn to_html_string(&self, id: AId<Node>, want_doctype: bool) -> Result<String> {
        let mut v = Vec::new();
        if want_doctype {
            self.print_html_document(id, &mut v)?
        } else {
            self.print_html_fragment(id, &mut v)?
        }
        // Only ever filled from str values and ASCII literals.
        Ok(String::from_utf8(v)?)
    }

    /// Text content only, ignoring all markup.
    pub fn to_plain_string(&self, id: AId<Node>) -> Result<String> {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        print_plain(&nodes, id, &mut out)?;
        Ok(out)
    }
}

pub fn html_escape(out: &mut impl Write, s: &str) -> std::io::Result<()> {
    let bytes = s.as_bytes();
    let mut last = 0;
    for (i, b) in bytes.iter().enumerate() {
        let rep: &[u8] = match b {
            b'&' => b"&amp;",
            b'<' => b"&lt;",
            b'>' => b"&gt;",
            b'"' => b"&quot;",
            b'\'' => b"&#39;",
            _ => continue
        };
        out.write_all(&bytes[last..i])?;
        out.write_all(rep)?;
        last = i + 1;
    }
    out.write_all(&bytes[last..])
}

fn get_node(nodes: &[Node], id: AId<Node>) -> Result<&Node> {
    match nodes.get(id.id as usize) {
        Some(node) => Ok(node),
        None => bail!("{id:?} was not allocated here")
    }
}

fn print_node(nodes: &[Node], id: AId<Node>, out: &mut impl Write) -> Result<()> {
    match get_node(nodes, id)? {
        Node::Element(e) => {
            let meta = e.meta;
            out.write_all(b"<")?;
            out.write_all(meta.tag_name.as_bytes())?;
            for (key, val) in &e.attr {
                out.write_all(b" ")?;
                out.write_all(key.as_bytes())?; // XX no escape ever needed?
                out.write_all(b"=\"")?;
                html_escape(out, val)?;
                out.write_all(b"\"")?;
            }
            out.write_all(b">")?;
            for child in &e.body {
                print_node(nodes, *child, out)?;
            }
            if meta.has_closing_tag {
                out.write_all(b"</")?;
                out.write_all(meta.tag_name.as_bytes())?;
                out.write_all(b">")?;
            }
        }
        Node::String(s) => html_escape(out, s)?,
        Node::None => (),
    }
    Ok(())
}

fn print_plain(nodes: &[Node], id: AId<Node>, out: &mut String) -> Result<()> {
    match get_node(nodes, id)? {
        Node::Element(e) =>
            for child in &e.body {
                print_plain(nodes, *child, out)?
            },
        Node::String(s) => out.push_str(s),
        Node::None => (),
    }
    Ok(())
}

macro_rules! def_elements {
    { $( $name:ident => $meta:ident; )* } => {
        impl HtmlAllocator {
            $(
                pub fn $name(
                    &self,
                    attr: impl IntoIterator<Item = Option<(KString, KString)>>,
                    body: impl IntoIterator<Item = AId<Node>>
                ) -> Result<AId<Node>>
                {
                    self.element(&$meta, attr, body)
                }
            )*
        }
    }
}

def_elements! {
    html => HTML_META;
    head => HEAD_META;
    meta => META_META;
    title => TITLE_META;
    script => SCRIPT_META;
    body => BODY_META;
    h1 => H1_META;
    div => DIV_META;
    p => P_META;
    a => A_META;
    form => FORM_META;
    label => LABEL_META;
    input => INPUT_META;
    button => BUTTON_META;
}
