//! Movement service
//!
//! Business logic for recording movements and their lines, looking them up
//! by id or document number, and moving them through their lifecycle.

use tracing::info;

use crate::error::{CostbookError, CostbookResult};
use crate::models::{
    Counterpart, Money, Movement, MovementDate, MovementId, MovementLine, MovementStatus,
    MovementType,
};
use crate::storage::Storage;

/// Service for movement management
pub struct MovementService<'a> {
    storage: &'a Storage,
}

/// One line as entered by the user
#[derive(Debug, Clone, PartialEq)]
pub struct LineInput {
    pub description: String,
    pub quantity: f64,
    pub unit_amount: Money,
}

impl LineInput {
    /// Parse `DESCRIPTION:QUANTITY:UNIT_AMOUNT`. The description may itself
    /// contain colons; the last two fields are always quantity and amount.
    pub fn parse(input: &str) -> CostbookResult<Self> {
        let invalid = || {
            CostbookError::Validation(format!(
                "Invalid line '{}'. Expected DESCRIPTION:QUANTITY:UNIT_AMOUNT",
                input
            ))
        };

        let mut parts = input.rsplitn(3, ':');
        let amount = parts.next().ok_or_else(invalid)?;
        let quantity = parts.next().ok_or_else(invalid)?;
        let description = parts.next().ok_or_else(invalid)?.trim();

        if description.is_empty() {
            return Err(invalid());
        }

        let quantity: f64 = quantity.trim().parse().map_err(|_| invalid())?;
        let unit_amount = Money::parse(amount)
            .map_err(|e| CostbookError::Validation(format!("Invalid line amount: {}", e)))?;

        Ok(Self {
            description: description.to_string(),
            quantity,
            unit_amount,
        })
    }
}

/// Input for creating a new movement
#[derive(Debug, Clone)]
pub struct CreateMovementInput {
    pub movement_type: MovementType,
    pub date: MovementDate,
    /// Computed from the lines when not given
    pub total: Option<Money>,
    pub counterpart: Counterpart,
    pub document_number: Option<String>,
    pub notes: Option<String>,
    pub status: Option<MovementStatus>,
    pub lines: Vec<LineInput>,
}

impl CreateMovementInput {
    pub fn new(movement_type: MovementType, date: impl Into<MovementDate>) -> Self {
        Self {
            movement_type,
            date: date.into(),
            total: None,
            counterpart: Counterpart::None,
            document_number: None,
            notes: None,
            status: None,
            lines: Vec::new(),
        }
    }
}

impl<'a> MovementService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a new movement together with its lines
    pub fn create(&self, input: CreateMovementInput) -> CostbookResult<Movement> {
        let total = match input.total {
            Some(total) => total,
            None if !input.lines.is_empty() => Money::zero(),
            None => {
                return Err(CostbookError::Validation(
                    "A movement needs a total or at least one line".into(),
                ))
            }
        };

        let mut movement = Movement::new(input.movement_type, input.date, total)
            .with_counterpart(input.counterpart);

        if let Some(doc) = input.document_number.map(|d| d.trim().to_string()) {
            if !doc.is_empty() {
                if let Some(existing) = self.storage.movements.find_by_document(&doc)? {
                    return Err(CostbookError::Validation(format!(
                        "Document number '{}' is already used by {}",
                        doc, existing.id
                    )));
                }
                movement.document_number = Some(doc);
            }
        }

        movement.notes = input
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        if let Some(status) = input.status {
            movement.status = status;
        }

        let lines: Vec<MovementLine> = input
            .lines
            .into_iter()
            .map(|l| {
                MovementLine::for_movement(
                    movement.movement_type,
                    movement.id,
                    l.description,
                    l.quantity,
                    l.unit_amount,
                )
            })
            .collect();

        for line in &lines {
            line.validate()
                .map_err(|e| CostbookError::Validation(e.to_string()))?;
        }

        if input.total.is_none() {
            movement.total = lines
                .iter()
                .try_fold(Money::zero(), |acc, l| acc.checked_add(l.line_total))
                .ok_or_else(|| {
                    CostbookError::Validation(
                        "Line amounts add up to more than can be stored".into(),
                    )
                })?;
        }

        movement
            .validate()
            .map_err(|e| CostbookError::Validation(e.to_string()))?;

        let line_count = lines.len();
        self.storage.movements.upsert(movement.clone())?;
        self.storage.lines.replace_for(movement.id, lines)?;
        self.storage.save_all()?;

        info!(
            id = %movement.id,
            movement_type = movement.movement_type.as_str(),
            total = %movement.total,
            lines = line_count,
            "recorded movement"
        );

        Ok(movement)
    }

    pub fn get(&self, id: MovementId) -> CostbookResult<Option<Movement>> {
        self.storage.movements.get(id)
    }

    /// Find a movement by full id, document number, or short id
    pub fn find(&self, identifier: &str) -> CostbookResult<Option<Movement>> {
        if let Ok(id) = identifier.parse::<MovementId>() {
            if let Some(movement) = self.storage.movements.get(id)? {
                return Ok(Some(movement));
            }
        }

        if let Some(movement) = self.storage.movements.find_by_document(identifier)? {
            return Ok(Some(movement));
        }

        let mut matches = self.storage.movements.find_by_id_fragment(identifier)?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => Err(CostbookError::Validation(format!(
                "'{}' matches {} movements; use more of the id",
                identifier, n
            ))),
        }
    }

    /// Like [`find`](Self::find), but a missing movement is an error
    pub fn require(&self, identifier: &str) -> CostbookResult<Movement> {
        self.find(identifier)?
            .ok_or_else(|| CostbookError::movement_not_found(identifier))
    }

    pub fn lines(&self, id: MovementId) -> CostbookResult<Vec<MovementLine>> {
        self.storage.lines.get_for(id)
    }

    /// Move a movement to a new lifecycle status
    pub fn set_status(&self, id: MovementId, status: MovementStatus) -> CostbookResult<Movement> {
        let mut movement = self
            .storage
            .movements
            .get(id)?
            .ok_or_else(|| CostbookError::movement_not_found(id.to_string()))?;

        if !movement.status.can_transition_to(status) {
            return Err(CostbookError::StatusChange(format!(
                "{} cannot go from {} to {}",
                movement.document_label(),
                movement.status,
                status
            )));
        }

        let before = movement.status;
        movement.set_status(status);

        self.storage.movements.upsert(movement.clone())?;
        self.storage.movements.save()?;

        info!(id = %movement.id, from = before.as_str(), to = status.as_str(), "changed movement status");

        Ok(movement)
    }

    /// Delete a draft movement and its lines
    pub fn delete(&self, id: MovementId) -> CostbookResult<Movement> {
        let movement = self
            .storage
            .movements
            .get(id)?
            .ok_or_else(|| CostbookError::movement_not_found(id.to_string()))?;

        if movement.status != MovementStatus::Draft {
            return Err(CostbookError::StatusChange(format!(
                "{} is {}. Only drafts can be deleted; void it instead.",
                movement.document_label(),
                movement.status
            )));
        }

        self.storage.movements.delete(id)?;
        let removed_lines = self.storage.lines.delete_for(id)?;
        self.storage.save_all()?;

        info!(id = %id, lines = removed_lines, "deleted movement");

        Ok(movement)
    }

    pub fn count(&self) -> CostbookResult<usize> {
        self.storage.movements.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CostbookPaths;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CostbookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn sale_input() -> CreateMovementInput {
        let mut input = CreateMovementInput::new(
            MovementType::Sale,
            MovementDate::from_date(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()),
        );
        input.counterpart = Counterpart::customer("Acme Corp");
        input.document_number = Some("INV-0001".into());
        input
    }

    #[test]
    fn test_line_input_parse() {
        let line = LineInput::parse("Flour 25kg:2:18.50").unwrap();
        assert_eq!(line.description, "Flour 25kg");
        assert_eq!(line.quantity, 2.0);
        assert_eq!(line.unit_amount, Money::from_cents(1850));

        let colon = LineInput::parse("Note: rush order:1:5").unwrap();
        assert_eq!(colon.description, "Note: rush order");

        assert!(LineInput::parse("Flour:two:1.00").is_err());
        assert!(LineInput::parse(":1:1.00").is_err());
        assert!(LineInput::parse("Flour:1").is_err());
    }

    #[test]
    fn test_create_computes_total_from_lines() {
        let (_temp_dir, storage) = create_test_storage();
        let service = MovementService::new(&storage);

        let mut input = sale_input();
        input.lines = vec![
            LineInput::parse("Croissant:12:1.25").unwrap(),
            LineInput::parse("Baguette:4:2.10").unwrap(),
        ];
        let movement = service.create(input).unwrap();

        assert_eq!(movement.total, Money::from_cents(1500 + 840));
        assert_eq!(movement.status, MovementStatus::Draft);

        let lines = service.lines(movement.id).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].unit_price, Some(Money::from_cents(125)));
        assert!(lines[0].unit_cost.is_none());
    }

    #[test]
    fn test_create_rejects_line_totals_that_overflow() {
        let (_temp_dir, storage) = create_test_storage();
        let service = MovementService::new(&storage);

        let mut input = sale_input();
        input.lines = vec![
            LineInput::parse("Bulk:1:92233720368547758").unwrap(),
            LineInput::parse("Bulk again:1:92233720368547758").unwrap(),
        ];
        assert!(service.create(input).unwrap_err().is_validation());
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_line_input_rejects_bad_amounts() {
        assert!(LineInput::parse("Flour:1:92233720368547759").is_err());
        assert!(LineInput::parse("Flour:1:abc10").is_err());
        assert!(LineInput::parse("Flour:1:10.999").is_err());
    }

    #[test]
    fn test_create_requires_total_or_lines() {
        let (_temp_dir, storage) = create_test_storage();
        let service = MovementService::new(&storage);

        let err = service.create(sale_input()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_create_rejects_duplicate_document() {
        let (_temp_dir, storage) = create_test_storage();
        let service = MovementService::new(&storage);

        let mut first = sale_input();
        first.total = Some(Money::from_cents(100));
        service.create(first).unwrap();

        let mut second = sale_input();
        second.total = Some(Money::from_cents(200));
        second.document_number = Some(" inv-0001 ".into());
        assert!(service.create(second).unwrap_err().is_validation());
    }

    #[test]
    fn test_create_rejects_negative_total() {
        let (_temp_dir, storage) = create_test_storage();
        let service = MovementService::new(&storage);

        let mut input = sale_input();
        input.total = Some(Money::from_cents(-100));
        assert!(service.create(input).unwrap_err().is_validation());
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_find_by_document_and_short_id() {
        let (_temp_dir, storage) = create_test_storage();
        let service = MovementService::new(&storage);

        let mut input = sale_input();
        input.total = Some(Money::from_cents(100));
        let movement = service.create(input).unwrap();

        assert_eq!(service.find("inv-0001").unwrap().unwrap().id, movement.id);
        assert_eq!(
            service.find(&movement.id.short()).unwrap().unwrap().id,
            movement.id
        );
        assert_eq!(
            service.find(&movement.id.to_string()).unwrap().unwrap().id,
            movement.id
        );
        assert!(service.find("INV-404").unwrap().is_none());
        assert!(service.require("INV-404").unwrap_err().is_not_found());
    }

    #[test]
    fn test_status_lifecycle() {
        let (_temp_dir, storage) = create_test_storage();
        let service = MovementService::new(&storage);

        let mut input = sale_input();
        input.total = Some(Money::from_cents(100));
        let movement = service.create(input).unwrap();

        let confirmed = service
            .set_status(movement.id, MovementStatus::Confirmed)
            .unwrap();
        assert_eq!(confirmed.status, MovementStatus::Confirmed);

        let err = service
            .set_status(movement.id, MovementStatus::Draft)
            .unwrap_err();
        assert!(matches!(err, CostbookError::StatusChange(_)));

        service
            .set_status(movement.id, MovementStatus::Voided)
            .unwrap();
        assert!(service
            .set_status(movement.id, MovementStatus::Completed)
            .is_err());
    }

    #[test]
    fn test_delete_only_drafts() {
        let (_temp_dir, storage) = create_test_storage();
        let service = MovementService::new(&storage);

        let mut input = sale_input();
        input.lines = vec![LineInput::parse("Tart:1:4.00").unwrap()];
        let draft = service.create(input).unwrap();

        let mut confirmed_input = sale_input();
        confirmed_input.document_number = Some("INV-0002".into());
        confirmed_input.total = Some(Money::from_cents(900));
        confirmed_input.status = Some(MovementStatus::Confirmed);
        let confirmed = service.create(confirmed_input).unwrap();

        assert!(matches!(
            service.delete(confirmed.id).unwrap_err(),
            CostbookError::StatusChange(_)
        ));

        service.delete(draft.id).unwrap();
        assert!(service.get(draft.id).unwrap().is_none());
        assert!(service.lines(draft.id).unwrap().is_empty());
        assert!(service.delete(draft.id).unwrap_err().is_not_found());
    }
}
