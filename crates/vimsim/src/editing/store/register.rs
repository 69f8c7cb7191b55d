use std::collections::BTreeMap;

use bitflags::bitflags;
use serde::Serialize;

use crate::prelude::Register;
use crate::prelude::TargetShape::{self, CharWise, LineWise};

bitflags! {
    /// Flags that control the behaviour of [RegisterStore::put].
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub struct RegisterPutFlags: u32 {
        /// No flags set.
        const NONE = 0b00000000;

        /// Append contents to register.
        const APPEND = 0b00000001;

        /// The value being put came from deleting text.
        const DELETE = 0b00000010;
    }
}

/// The current values mapped to by a [Register].
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize)]
pub struct RegisterCell {
    /// The shape of the text within the [Register].
    #[serde(rename = "kind")]
    pub shape: TargetShape,

    /// The actual stored text.
    ///
    /// Line-wise text always ends with a newline.
    #[serde(rename = "text")]
    pub value: String,
}

impl RegisterCell {
    /// Create a new cell.
    pub fn new<T: Into<String>>(shape: TargetShape, value: T) -> Self {
        RegisterCell { shape, value: value.into() }
    }

    /// Whether this cell contains no text.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Merge the contents of two register cells, respecting their shapes.
    pub fn merge(&self, other: &RegisterCell) -> RegisterCell {
        match (self.shape, other.shape) {
            (CharWise, CharWise) | (LineWise, LineWise) => {
                /*
                 * These combinations keep the existing cell's shape, and don't
                 * need any additional characters when merged:
                 *
                 * Char + Char = Char
                 * Line + Line = Line
                 */
                let text = format!("{}{}", self.value, other.value);
                RegisterCell::new(self.shape, text)
            },
            (CharWise, LineWise) => {
                /*
                 * Appending lines to characters takes on the appended cell's shape, and
                 * needs a newline added in between the contents.
                 */
                let text = format!("{}\n{}", self.value, other.value);
                RegisterCell::new(other.shape, text)
            },
            (LineWise, CharWise) => {
                /*
                 * Appending characters to lines keeps the existing cell's shape, and
                 * needs a newline appended after the contents.
                 */
                let text = format!("{}{}\n", self.value, other.value);
                RegisterCell::new(self.shape, text)
            },
        }
    }
}

impl From<&str> for RegisterCell {
    fn from(s: &str) -> RegisterCell {
        RegisterCell::new(TargetShape::CharWise, s)
    }
}

impl From<(TargetShape, &str)> for RegisterCell {
    fn from(c: (TargetShape, &str)) -> RegisterCell {
        RegisterCell::new(c.0, c.1)
    }
}

/// Storage for [Register] values.
///
/// Writing to most registers also updates the unnamed register. Yanks and deletes made through
/// the unnamed register additionally fill the numbered registers: yanks go to `"0`, deletes of
/// a line or more shift through `"1` to `"9`, and smaller deletes go to `"-`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RegisterStore {
    last_yanked: RegisterCell,
    last_deleted: Vec<RegisterCell>,
    small_delete: RegisterCell,
    unnamed: RegisterCell,
    named: BTreeMap<char, RegisterCell>,
}

impl RegisterStore {
    fn new() -> Self {
        RegisterStore {
            last_yanked: RegisterCell::default(),
            last_deleted: vec![RegisterCell::default(); 9],
            small_delete: RegisterCell::default(),
            unnamed: RegisterCell::default(),
            named: BTreeMap::new(),
        }
    }

    fn push_deleted(&mut self, cell: RegisterCell) {
        if cell.shape == CharWise && !cell.value.contains('\n') {
            self.small_delete = cell;
        } else {
            self.last_deleted.insert(0, cell);
            self.last_deleted.truncate(9);
        }
    }

    /// Get the current value of a [Register].
    pub fn get(&self, reg: &Register) -> RegisterCell {
        match reg {
            Register::Unnamed => self.unnamed.clone(),
            Register::RecentlyDeleted(off) => {
                self.last_deleted.get(*off).cloned().unwrap_or_default()
            },
            Register::SmallDelete => self.small_delete.clone(),
            Register::Named(name) => self.named.get(name).cloned().unwrap_or_default(),
            Register::LastYanked => self.last_yanked.clone(),
            Register::Blackhole => RegisterCell::default(),
        }
    }

    /// Get the current value of a register by the character that names it.
    pub fn get_by_name(&self, name: char) -> Option<RegisterCell> {
        let (reg, _) = Register::from_char(name)?;

        Some(self.get(&reg))
    }

    /// Every register that currently holds text, keyed by its name.
    pub fn contents(&self) -> BTreeMap<char, RegisterCell> {
        let mut regs = BTreeMap::new();
        let mut add = |reg: Register, cell: &RegisterCell| {
            if !cell.is_empty() {
                regs.insert(reg.name(), cell.clone());
            }
        };

        add(Register::Unnamed, &self.unnamed);
        add(Register::LastYanked, &self.last_yanked);
        add(Register::SmallDelete, &self.small_delete);

        for (i, cell) in self.last_deleted.iter().enumerate() {
            add(Register::RecentlyDeleted(i), cell);
        }

        for (name, cell) in self.named.iter() {
            add(Register::Named(*name), cell);
        }

        regs
    }

    /// Update the current value of a [Register] with `cell`.
    ///
    /// The `APPEND` flag controls whether this should wholly replace or append to the current
    /// value. The `DELETE` flag indicates whether this register update is being done as part
    /// of a text deletion in the buffer.
    pub fn put(&mut self, reg: &Register, mut cell: RegisterCell, flags: RegisterPutFlags) {
        if flags.contains(RegisterPutFlags::APPEND) {
            cell = self.get(reg).merge(&cell);
        }

        /*
         * For each register, take care of storing the value with the correct behaviour. If we're
         * storing the blackhole register, we don't do anything. For all other registers, we update
         * the unnamed ("") register with the exact same value.
         */
        let unnamed = match reg {
            Register::Blackhole => return,

            Register::Unnamed => {
                if flags.contains(RegisterPutFlags::DELETE) {
                    self.push_deleted(cell.clone());
                } else {
                    self.last_yanked = cell.clone();
                }
                cell
            },
            Register::Named(name) => {
                self.named.insert(*name, cell.clone());
                cell
            },
            Register::RecentlyDeleted(off) => {
                if let Some(elem) = self.last_deleted.get_mut(*off) {
                    *elem = cell.clone();
                }

                cell
            },
            Register::SmallDelete => {
                self.small_delete = cell.clone();
                cell
            },
            Register::LastYanked => {
                self.last_yanked = cell.clone();
                cell
            },
        };

        self.unnamed = unnamed;
    }
}

impl Default for RegisterStore {
    fn default() -> RegisterStore {
        RegisterStore::new()
    }
}
