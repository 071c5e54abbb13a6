//! XML utility functions for navigating and extracting data from DOM trees.

use roxmltree::Node;

/// Get the tag name without namespace prefix.
///
/// # Arguments
/// * `node` - XML node
///
/// # Returns
/// Tag name without namespace (e.g., "record" not "{ns}record")
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use oai_harvester::xml::get_tag_name;
///
/// let xml = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/"><record/></OAI-PMH>"#;
/// let doc = Document::parse(xml).unwrap();
/// let record = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(record), "record");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Find the first child element with the given tag name.
///
/// # Arguments
/// * `node` - Parent node to search in
/// * `tag` - Tag name to search for
///
/// # Returns
/// First matching child element, or `None` if not found
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use oai_harvester::xml::find_child;
///
/// let xml = r#"<record><header/><metadata/></record>"#;
/// let doc = Document::parse(xml).unwrap();
/// let record = doc.root_element();
///
/// assert!(find_child(record, "header").is_some());
/// assert!(find_child(record, "about").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find all child elements with the given tag name.
///
/// # Arguments
/// * `node` - Parent node to search in
/// * `tag` - Tag name to search for
///
/// # Returns
/// Iterator over matching child elements
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use oai_harvester::xml::find_children;
///
/// let xml = r#"<header><setSpec>math</setSpec><setSpec>physics</setSpec></header>"#;
/// let doc = Document::parse(xml).unwrap();
/// let specs: Vec<_> = find_children(doc.root_element(), "setSpec").collect();
/// assert_eq!(specs.len(), 2);
/// ```
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find a descendant element matching a path of tag names.
///
/// # Arguments
/// * `node` - Starting node
/// * `path` - Slash-separated path of tag names (e.g., "GetRecord/record")
///
/// # Returns
/// Matching element, or `None` if path not found
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use oai_harvester::xml::find_by_path;
///
/// let xml = r#"<OAI-PMH><GetRecord><record>x</record></GetRecord></OAI-PMH>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let record = find_by_path(doc.root_element(), "GetRecord/record");
/// assert!(record.is_some());
/// ```
pub fn find_by_path<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
    let parts: Vec<&str> = path.split('/').collect();
    let mut current = node;

    for part in parts {
        current = find_child(current, part)?;
    }

    Some(current)
}

/// Get the text content of a node, trimmed.
///
/// # Arguments
/// * `node` - Node to get text from
///
/// # Returns
/// Trimmed text content, or empty string if no text
pub fn get_text(node: Node<'_, '_>) -> String {
    node.text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Get an attribute value from a node.
///
/// # Arguments
/// * `node` - Node to get attribute from
/// * `name` - Attribute name
///
/// # Returns
/// Attribute value, or `None` if not found
pub fn get_attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name)
}

/// Get all element children of a node.
///
/// # Arguments
/// * `node` - Parent node
///
/// # Returns
/// Iterator over element children (excludes text nodes, comments, etc.)
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Get the inner markup of an element, uninterpreted.
///
/// Slices the original document text between the element's start and end
/// tags, so the content round-trips byte for byte. Namespace declarations on
/// ancestor elements are not copied in; an inner payload that relies on them
/// will fail to re-parse on its own.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use oai_harvester::xml::{find_child, inner_xml};
///
/// let xml = r#"<record><metadata><dc><title>X</title></dc></metadata></record>"#;
/// let doc = Document::parse(xml).unwrap();
/// let metadata = find_child(doc.root_element(), "metadata").unwrap();
/// assert_eq!(inner_xml(metadata), "<dc><title>X</title></dc>");
/// ```
pub fn inner_xml(node: Node<'_, '_>) -> String {
    let first = node.first_child();
    let last = node.last_child();

    match (first, last) {
        (Some(first), Some(last)) => {
            let start = first.range().start;
            let end = last.range().end;
            node.document().input_text()[start..end].to_string()
        }
        _ => String::new(),
    }
}
