//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up a variant by its database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( x if x == $val => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Ticket lifecycle status (`ticket_statuses`).
    TicketStatus {
        Active = 1,
        /// Checked in at the door.
        Used = 2,
        Cancelled = 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinema_core::ticket_ledger::state_machine;

    #[test]
    fn ticket_status_ids_match_core() {
        assert_eq!(TicketStatus::Active.id(), state_machine::ACTIVE);
        assert_eq!(TicketStatus::Used.id(), state_machine::USED);
        assert_eq!(TicketStatus::Cancelled.id(), state_machine::CANCELLED);
    }

    #[test]
    fn from_id_round_trips() {
        assert_eq!(TicketStatus::from_id(2), Some(TicketStatus::Used));
        assert_eq!(TicketStatus::from_id(9), None);
    }
}
