//! Snapshot tests for the readers.
//!
//! Run `cargo insta review` to update snapshots after intentional changes.

use y2r_ycp::{Node, read_json, read_xml};

fn xml(source: &str) -> Node {
    y2r_ycp::lower(&read_xml(source).expect("parse failed")).expect("lower failed")
}

fn json(source: &str) -> Node {
    y2r_ycp::lower(&read_json(source).expect("parse failed")).expect("lower failed")
}

#[test]
fn assign_constant() {
    insta::assert_json_snapshot!(xml(r#"<assign name="i"><const type="int" value="42"/></assign>"#), @r#"
    {
      "Assign": {
        "ns": null,
        "name": "i",
        "value": {
          "Const": {
            "ty": "int",
            "value": "42"
          }
        }
      }
    }
    "#);
}

#[test]
fn qualified_call() {
    insta::assert_json_snapshot!(xml(r#"<call name="Foo::bar" category="function" type="void ()"/>"#), @r#"
    {
      "Call": {
        "ns": "Foo",
        "name": "bar",
        "category": "function",
        "ty": "void ()",
        "args": []
      }
    }
    "#);
}

#[test]
fn comparison() {
    insta::assert_json_snapshot!(xml(
        r#"<compare op="&lt;"><variable name="a" category="variable"/><const type="int" value="1"/></compare>"#
    ), @r#"
    {
      "Compare": {
        "op": "Lt",
        "lhs": {
          "Variable": {
            "ns": null,
            "name": "a",
            "category": "variable",
            "ty": null
          }
        },
        "rhs": {
          "Const": {
            "ty": "int",
            "value": "1"
          }
        }
      }
    }
    "#);
}

#[test]
fn if_without_else() {
    insta::assert_json_snapshot!(xml(
        r#"<if><cond><const type="bool" value="true"/></cond><then><break/></then></if>"#
    ), @r#"
    {
      "If": {
        "cond": {
          "Const": {
            "ty": "bool",
            "value": "true"
          }
        },
        "then": "Break",
        "otherwise": null
      }
    }
    "#);
}

#[test]
fn json_while_loop() {
    insta::assert_json_snapshot!(json(
        r#"{"kind": "while", "children": [
            {"kind": "cond", "children": [{"kind": "const", "attrs": {"type": "bool", "value": "false"}}]},
            {"kind": "body", "children": [{"kind": "continue"}]}
        ]}"#
    ), @r#"
    {
      "While": {
        "cond": {
          "Const": {
            "ty": "bool",
            "value": "false"
          }
        },
        "body": "Continue"
      }
    }
    "#);
}

#[test]
fn xml_and_json_agree() {
    let from_xml = xml(r#"<import name="Popup"/>"#);
    let from_json = json(r#"{"kind": "import", "attrs": {"name": "Popup"}}"#);
    assert_eq!(from_xml, from_json);
    assert_eq!(from_xml, Node::Import { name: "Popup".into() });
}
