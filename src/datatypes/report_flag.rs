use num_enum::TryFromPrimitive;

/// Yes/No octet shared by X-Mms-Delivery-Report (0x86) and X-Mms-Read-Report (0x90).
///
/// Both reports are off unless the sender asks for them.
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReportFlag {
    Yes = 0x80,
    #[default]
    No = 0x81,
}

impl ReportFlag {
    pub fn is_requested(self) -> bool {
        self == ReportFlag::Yes
    }
}

impl From<bool> for ReportFlag {
    fn from(requested: bool) -> Self {
        if requested { ReportFlag::Yes } else { ReportFlag::No }
    }
}
