use std::{collections::BTreeMap, fmt};

use crate::{
    Value,
    constants::{MESG_FILE_ID, MESG_MONITORING},
};

/// One decoded data message: its global message number and the valid fields
/// it carried, keyed by field definition number.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    pub global: u16,
    pub fields: BTreeMap<u8, Value>,
}

impl RawRecord {
    pub fn new(global: u16) -> Self {
        Self {
            global,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, number: u8, value: Value) -> Self {
        self.fields.insert(number, value);
        self
    }

    pub fn field(&self, number: u8) -> Option<&Value> {
        self.fields.get(&number)
    }

    pub fn has_field(&self, number: u8) -> bool {
        self.fields.contains_key(&number)
    }

    pub fn name(&self) -> &'static str {
        match self.global {
            MESG_FILE_ID => "file_id",
            MESG_MONITORING => "monitoring",
            _ => "other",
        }
    }
}

impl fmt::Display for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{}) {{", self.name(), self.global)?;
        for (i, (number, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, " {number}: {value}")?;
        }
        f.write_str(" }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_fields() {
        let record = RawRecord::new(MESG_MONITORING)
            .with_field(27, Value::UInt8(61))
            .with_field(26, Value::UInt16(300));
        assert_eq!(record.to_string(), "monitoring (#55) { 26: 300, 27: 61 }");
    }

    #[test]
    fn unknown_messages_are_other() {
        let record = RawRecord::new(20);
        assert_eq!(record.name(), "other");
        assert!(!record.has_field(0));
    }
}
