//! Program Symbol Table.
//!
//! Maps labels to addresses. Text labels hold byte addresses (instruction
//! index x 4); data labels hold word addresses in data memory. The table is
//! built once by the loader and only read afterwards.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::common::INSTRUCTION_BYTES;
use crate::isa::instruction::Target;

/// Label-to-address mapping for one program.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SymbolTable {
    text: BTreeMap<String, u32>,
    data: BTreeMap<String, u32>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `label` is defined in either section.
    pub fn contains(&self, label: &str) -> bool {
        self.text.contains_key(label) || self.data.contains_key(label)
    }

    /// Binds a text label to a byte address. Returns false if the label already exists.
    pub fn define_text(&mut self, label: &str, addr: u32) -> bool {
        if self.contains(label) {
            return false;
        }
        let _ = self.text.insert(label.to_string(), addr);
        true
    }

    /// Binds a data label to a word address. Returns false if the label already exists.
    pub fn define_data(&mut self, label: &str, addr: u32) -> bool {
        if self.contains(label) {
            return false;
        }
        let _ = self.data.insert(label.to_string(), addr);
        true
    }

    /// Byte address of a text label.
    pub fn text_address(&self, label: &str) -> Option<u32> {
        self.text.get(label).copied()
    }

    /// Word address of a data label.
    pub fn data_address(&self, label: &str) -> Option<u32> {
        self.data.get(label).copied()
    }

    /// Value loaded by `la`: the data word address, else the text byte address.
    pub fn address_of(&self, label: &str) -> Option<i32> {
        self.data_address(label)
            .or_else(|| self.text_address(label))
            .map(|addr| addr as i32)
    }

    /// Resolves a branch or jump target taken from the instruction at `pc`.
    ///
    /// Labels map to their text address; numeric offsets count instructions
    /// relative to `pc`.
    ///
    /// # Errors
    ///
    /// Returns the label name if it is not a text label.
    pub fn resolve<'a>(&self, target: &'a Target, pc: u32) -> Result<i64, &'a str> {
        match target {
            Target::Label(label) => self
                .text_address(label)
                .map(i64::from)
                .ok_or(label.as_str()),
            Target::Offset(offset) => {
                Ok(i64::from(pc) + i64::from(*offset) * i64::from(INSTRUCTION_BYTES))
            }
        }
    }

    /// Text labels in name order.
    pub fn text_labels(&self) -> impl Iterator<Item = (&str, u32)> {
        self.text.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Data labels in name order.
    pub fn data_labels(&self) -> impl Iterator<Item = (&str, u32)> {
        self.data.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
