//! Helpers de navigation dans un arbre `xmltree`.
//!
//! Les éléments sont toujours comparés sur le couple (URI de namespace, nom
//! local), jamais sur le préfixe utilisé dans le document.

use xmltree::{Element, XMLNode};

/// Itère sur les enfants de type élément (ignore texte, commentaires, etc.)
pub fn xml_children(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(|node| match node {
        XMLNode::Element(elem) => Some(elem),
        _ => None,
    })
}

/// Vrai si l'élément porte ce nom local dans ce namespace.
pub fn is_named(element: &Element, namespace: &str, name: &str) -> bool {
    element.name == name && element.namespace.as_deref() == Some(namespace)
}

/// Enfants directs correspondant à (namespace, nom), dans l'ordre du document.
pub fn children_named<'a>(
    element: &'a Element,
    namespace: &'a str,
    name: &'a str,
) -> impl Iterator<Item = &'a Element> + 'a {
    xml_children(element).filter(move |child| is_named(child, namespace, name))
}

/// Premier enfant direct correspondant à (namespace, nom).
pub fn find_child<'a>(element: &'a Element, namespace: &str, name: &str) -> Option<&'a Element> {
    xml_children(element).find(|child| is_named(child, namespace, name))
}

/// Texte d'un élément, sans espaces de début/fin.
pub fn trimmed_text(element: &Element) -> String {
    element
        .get_text()
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

/// Attribut non préfixé d'un élément.
pub fn attribute<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element.attributes.get(name).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS_A: &str = "urn:test:a";
    const NS_B: &str = "urn:test:b";

    fn parse(xml: &str) -> Element {
        Element::parse(xml.as_bytes()).expect("valid xml")
    }

    #[test]
    fn test_matches_namespace_not_prefix() {
        let root = parse(
            r#"<root xmlns="urn:test:a" xmlns:x="urn:test:b">
                 <item>one</item>
                 <x:item>two</x:item>
               </root>"#,
        );

        let a: Vec<String> = children_named(&root, NS_A, "item").map(trimmed_text).collect();
        let b: Vec<String> = children_named(&root, NS_B, "item").map(trimmed_text).collect();

        assert_eq!(a, vec!["one"]);
        assert_eq!(b, vec!["two"]);
    }

    #[test]
    fn test_other_prefix_same_namespace() {
        let root = parse(r#"<y:root xmlns:y="urn:test:b"><y:leaf>  v  </y:leaf></y:root>"#);
        let leaf = find_child(&root, NS_B, "leaf").unwrap();
        assert_eq!(trimmed_text(leaf), "v");
        assert!(find_child(&root, NS_A, "leaf").is_none());
    }

    #[test]
    fn test_children_skip_text_nodes() {
        let root = parse("<r>text<a/>more<b/></r>");
        let names: Vec<&str> = xml_children(&root).map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_attribute_lookup() {
        let root = parse(r#"<r title=" News "/>"#);
        assert_eq!(attribute(&root, "title"), Some(" News "));
        assert_eq!(attribute(&root, "missing"), None);
    }

    #[test]
    fn test_trimmed_text_of_empty_element() {
        let root = parse("<r/>");
        assert_eq!(trimmed_text(&root), "");
    }
}
