//! Screen flow of one operator session, as an explicit state machine.
//!
//! ```text
//! Menu ─► Selecting ─► Reserving ─► Receipt ─► Menu
//!   │          ▲            │
//!   │          └── cancel ──┘
//!   ├─► Deleting ─► Menu
//!   └─► Listing  ─► Menu
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::aggregation::{group_by_customer, CustomerGroup};
use crate::catalog::SeatId;
use crate::error::{ReservationError, Result};
use crate::models::{ContactPolicy, Person, ReservationRecord, Seat};
use crate::selection::SeatSelection;
use crate::store::{DeleteBy, ReservationStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Screen {
    Menu,
    /// Choosing how many seats to book.
    Selecting,
    /// Picking seats on the grid and naming a person for each.
    Reserving,
    Deleting,
    Listing,
    Receipt,
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Menu => "menu",
            Screen::Selecting => "seat count",
            Screen::Reserving => "seat selection",
            Screen::Deleting => "delete reservation",
            Screen::Listing => "reservation list",
            Screen::Receipt => "receipt",
        }
    }
}

pub struct Session {
    store: Arc<dyn ReservationStore>,
    policy: ContactPolicy,
    screen: Screen,
    draft: SeatSelection,
    seats: Vec<Seat>,
    receipt: Vec<ReservationRecord>,
}

impl Session {
    pub fn new(store: Arc<dyn ReservationStore>, policy: ContactPolicy) -> Self {
        Self {
            store,
            policy,
            screen: Screen::Menu,
            draft: SeatSelection::default(),
            seats: Vec::new(),
            receipt: Vec::new(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Seat snapshot as of the last refresh.
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn draft(&self) -> &SeatSelection {
        &self.draft
    }

    /// Records created by the last successful submit.
    pub fn receipt(&self) -> &[ReservationRecord] {
        &self.receipt
    }

    pub fn start_reservation(&mut self) -> Result<()> {
        self.require(Screen::Menu, "start reservation")?;
        self.screen = Screen::Selecting;
        Ok(())
    }

    pub async fn choose_seat_count(&mut self, count: u8) -> Result<()> {
        self.require(Screen::Selecting, "choose seat count")?;
        self.draft.set_target(count)?;
        self.refresh().await?;
        self.screen = Screen::Reserving;
        Ok(())
    }

    /// Goes back to the count screen, keeping the seats picked so far.
    pub fn change_seat_count(&mut self) -> Result<()> {
        self.require(Screen::Reserving, "change seat count")?;
        self.screen = Screen::Selecting;
        Ok(())
    }

    pub fn click_seat(&mut self, seat_id: SeatId) -> Result<bool> {
        self.require(Screen::Reserving, "select seat")?;
        let seat = self.seats.get(seat_id.index()).ok_or_else(|| missing(seat_id))?;
        Ok(self.draft.select_seat(seat))
    }

    pub fn assign_person(&mut self, seat_id: SeatId, name: &str, contact: Option<&str>) -> Result<()> {
        self.require(Screen::Reserving, "assign person")?;
        let person = Person::new(name, contact, self.policy)?;
        let seat = self.seats.get(seat_id.index()).ok_or_else(|| missing(seat_id))?;
        if !self.draft.is_selected(seat_id) && !self.draft.select_seat(seat) {
            return Err(ReservationError::validation(format!(
                "seat {seat_id} cannot be added to this reservation"
            )));
        }
        self.draft.assign_person(seat_id, person)
    }

    /// Books the draft. After a conflict the snapshot is refreshed so the
    /// grid shows the seats someone else took; the draft is kept.
    ///
    /// Once the store accepts the batch the result is `Ok` and the screen is
    /// `Receipt`, even if reloading the seat snapshot afterwards fails.
    pub async fn submit(&mut self) -> Result<&[ReservationRecord]> {
        self.require(Screen::Reserving, "submit")?;
        let result = self.draft.submit(self.store.as_ref()).await;
        match result {
            Ok(created) => {
                self.receipt = created;
                self.screen = Screen::Receipt;
                if let Err(e) = self.refresh().await {
                    warn!("Reservation stored, seat snapshot not refreshed: {}", e);
                }
                Ok(&self.receipt)
            }
            Err(err) => {
                if matches!(err, ReservationError::SeatAlreadyOccupied(_)) {
                    if let Err(e) = self.refresh().await {
                        warn!("Seat snapshot not refreshed after conflict: {}", e);
                    }
                }
                Err(err)
            }
        }
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.require(Screen::Reserving, "cancel")?;
        self.draft.cancel();
        self.screen = Screen::Selecting;
        Ok(())
    }

    pub async fn start_deleting(&mut self) -> Result<()> {
        self.require(Screen::Menu, "delete reservation")?;
        self.refresh().await?;
        self.screen = Screen::Deleting;
        Ok(())
    }

    pub async fn delete_seat(&mut self, seat_id: SeatId) -> Result<Vec<ReservationRecord>> {
        self.require(Screen::Deleting, "delete seat")?;
        let removed = self
            .store
            .delete_reservation(&[seat_id.to_string()], DeleteBy::SeatId)
            .await?;
        self.refresh().await?;
        Ok(removed)
    }

    pub async fn open_listing(&mut self) -> Result<Vec<CustomerGroup>> {
        self.require(Screen::Menu, "list reservations")?;
        let records = self.store.list_reservations().await?;
        self.screen = Screen::Listing;
        Ok(group_by_customer(&records))
    }

    pub fn back_to_menu(&mut self) {
        self.draft.cancel();
        self.receipt.clear();
        self.screen = Screen::Menu;
    }

    async fn refresh(&mut self) -> Result<()> {
        self.seats = self.store.list_seats().await?;
        debug!("Seat snapshot refreshed on {} screen", self.screen.name());
        Ok(())
    }

    fn require(&self, screen: Screen, action: &'static str) -> Result<()> {
        if self.screen == screen {
            Ok(())
        } else {
            Err(ReservationError::InvalidTransition {
                screen: self.screen.name(),
                action,
            })
        }
    }
}

fn missing(seat_id: SeatId) -> ReservationError {
    ReservationError::InvalidSeatId(format!("{seat_id} is missing from the seat snapshot"))
}
