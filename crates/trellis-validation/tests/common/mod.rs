//! Shared test support: a minimal JSON reader that produces
//! offset-accurate syntax trees.
//!
//! Offsets and lengths are byte positions in the input; string nodes span
//! their quotes while carrying the decoded value, so length checks count
//! Unicode code points rather than source bytes. This reader exists only
//! for tests; the shipped library contains no parser.

use trellis_ast::{NodeId, SyntaxTree};
use trellis_validation::{Document, Schema};

pub fn document(text: &str) -> Document {
    Document::new(tree(text))
}

pub fn schema(value: serde_json::Value) -> Schema {
    Schema::from_value(&value)
}

fn tree(text: &str) -> SyntaxTree {
    let mut parser = Parser {
        bytes: text.as_bytes(),
        pos: 0,
        tree: SyntaxTree::new(),
    };
    parser.skip_whitespace();
    let root = parser.parse_value();
    parser.tree.set_root(root).unwrap();
    parser.tree
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    tree: SyntaxTree,
}

impl Parser<'_> {
    fn peek(&self) -> u8 {
        self.bytes[self.pos]
    }

    fn bump(&mut self, expected: u8) {
        assert_eq!(self.peek(), expected, "unexpected byte at {}", self.pos);
        self.pos += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn parse_value(&mut self) -> NodeId {
        match self.peek() {
            b'{' => self.parse_object(),
            b'[' => self.parse_array(),
            b'"' => self.parse_string(),
            b't' => {
                let start = self.pos;
                self.pos += 4;
                self.tree.add_boolean(start, 4, true)
            }
            b'f' => {
                let start = self.pos;
                self.pos += 5;
                self.tree.add_boolean(start, 5, false)
            }
            b'n' => {
                let start = self.pos;
                self.pos += 4;
                self.tree.add_null(start, 4)
            }
            _ => self.parse_number(),
        }
    }

    fn parse_number(&mut self) -> NodeId {
        let start = self.pos;
        if self.peek() == b'-' {
            self.pos += 1;
        }
        while self.pos < self.bytes.len()
            && matches!(self.bytes[self.pos], b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-')
        {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap();
        let is_integer = !text.contains(['.', 'e', 'E']);
        self.tree
            .add_number(start, self.pos - start, text.parse().unwrap(), is_integer)
    }

    fn parse_string(&mut self) -> NodeId {
        let start = self.pos;
        self.bump(b'"');
        let mut value = String::new();
        loop {
            match self.peek() {
                b'"' => {
                    self.pos += 1;
                    break;
                }
                b'\\' => {
                    self.pos += 1;
                    let escape = self.peek();
                    self.pos += 1;
                    match escape {
                        b'n' => value.push('\n'),
                        b'r' => value.push('\r'),
                        b't' => value.push('\t'),
                        b'u' => {
                            let hex =
                                std::str::from_utf8(&self.bytes[self.pos..self.pos + 4]).unwrap();
                            value.push(char::from_u32(u32::from_str_radix(hex, 16).unwrap()).unwrap());
                            self.pos += 4;
                        }
                        other => value.push(other as char),
                    }
                }
                _ => {
                    let rest = std::str::from_utf8(&self.bytes[self.pos..]).unwrap();
                    let ch = rest.chars().next().unwrap();
                    value.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
        self.tree.add_string(start, self.pos - start, value)
    }

    fn parse_array(&mut self) -> NodeId {
        let start = self.pos;
        self.bump(b'[');
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == b']' {
            self.pos += 1;
        } else {
            loop {
                self.skip_whitespace();
                items.push(self.parse_value());
                self.skip_whitespace();
                match self.peek() {
                    b',' => self.pos += 1,
                    b']' => {
                        self.pos += 1;
                        break;
                    }
                    other => panic!("unexpected byte {other} in array at {}", self.pos),
                }
            }
        }
        self.tree.add_array(start, self.pos - start, items).unwrap()
    }

    fn parse_object(&mut self) -> NodeId {
        let start = self.pos;
        self.bump(b'{');
        let mut properties = Vec::new();
        self.skip_whitespace();
        if self.peek() == b'}' {
            self.pos += 1;
        } else {
            loop {
                self.skip_whitespace();
                let key = self.parse_string();
                self.skip_whitespace();
                let colon = self.pos;
                self.bump(b':');
                self.skip_whitespace();
                let value = self.parse_value();
                let key_offset = self.tree.get(key).offset();
                let length = self.tree.get(value).end() - key_offset;
                properties.push(
                    self.tree
                        .add_property(key_offset, length, key, Some(value), Some(colon))
                        .unwrap(),
                );
                self.skip_whitespace();
                match self.peek() {
                    b',' => self.pos += 1,
                    b'}' => {
                        self.pos += 1;
                        break;
                    }
                    other => panic!("unexpected byte {other} in object at {}", self.pos),
                }
            }
        }
        self.tree
            .add_object(start, self.pos - start, properties)
            .unwrap()
    }
}
