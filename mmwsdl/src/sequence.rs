//! Sequence semantics for "array of X" records.
//!
//! A sequence carrier designates exactly one of its fields as the carried
//! collection. Every record implements [`SequenceAdapter`]; records without
//! a carried field answer "not a sequence" (`count() == -1`) instead of
//! failing.
//!
//! Traversal state lives in a [`Cursor`] owned by the caller, never in the
//! record itself.

/// Indexed, countable access to the collection carried by a record.
pub trait SequenceAdapter {
    /// Element type of the carried collection
    type Item;

    /// The carried collection, `None` for records that carry none
    fn carried(&self) -> Option<&[Self::Item]>;

    /// Mutable access to the carried collection
    fn carried_mut(&mut self) -> Option<&mut Vec<Self::Item>>;

    /// Number of carried elements, `-1` when the record is not a sequence.
    fn count(&self) -> isize {
        self.carried().map_or(-1, |items| items.len() as isize)
    }

    fn length(&self) -> isize {
        self.count()
    }

    fn is_sequence(&self) -> bool {
        self.carried().is_some()
    }

    fn exists(&self, index: usize) -> bool {
        self.carried().is_some_and(|items| index < items.len())
    }

    /// Element at `index`, `None` when out of range or not a sequence.
    fn get(&self, index: usize) -> Option<&Self::Item> {
        self.carried().and_then(|items| items.get(index))
    }

    fn item(&self, index: usize) -> Option<&Self::Item> {
        self.get(index)
    }

    fn first(&self) -> Option<&Self::Item> {
        self.carried().and_then(|items| items.first())
    }

    fn last(&self) -> Option<&Self::Item> {
        self.carried().and_then(|items| items.last())
    }

    /// Appends `item`. Returns `false` when the record is not a sequence.
    fn add(&mut self, item: Self::Item) -> bool {
        match self.carried_mut() {
            Some(items) => {
                items.push(item);
                true
            }
            None => false,
        }
    }

    /// The collection to put on the wire in place of the wrapper record.
    fn to_send(&self) -> Option<&[Self::Item]> {
        self.carried()
    }

    /// A fresh cursor positioned on the first element.
    fn cursor(&self) -> Cursor<'_, Self>
    where
        Self: Sized,
    {
        Cursor::new(self)
    }
}

/// Restartable traversal position over a [`SequenceAdapter`].
///
/// ```
/// use mmwsdl::{Cursor, SequenceAdapter};
///
/// struct Numbers(Vec<u32>);
///
/// impl SequenceAdapter for Numbers {
///     type Item = u32;
///     fn carried(&self) -> Option<&[u32]> { Some(&self.0) }
///     fn carried_mut(&mut self) -> Option<&mut Vec<u32>> { Some(&mut self.0) }
/// }
///
/// let numbers = Numbers(vec![4, 5]);
/// let mut cursor = Cursor::new(&numbers);
/// let mut seen = Vec::new();
/// while cursor.has_current() {
///     seen.push(*cursor.current().unwrap());
///     cursor.advance();
/// }
/// assert_eq!(seen, vec![4, 5]);
/// ```
#[derive(Debug)]
pub struct Cursor<'a, S: SequenceAdapter> {
    sequence: &'a S,
    position: usize,
}

impl<S: SequenceAdapter> Clone for Cursor<'_, S> {
    fn clone(&self) -> Self {
        Self {
            sequence: self.sequence,
            position: self.position,
        }
    }
}

impl<'a, S: SequenceAdapter> Cursor<'a, S> {
    pub fn new(sequence: &'a S) -> Self {
        Self {
            sequence,
            position: 0,
        }
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn advance(&mut self) {
        self.position += 1;
    }

    pub fn current(&self) -> Option<&'a S::Item> {
        self.sequence.get(self.position)
    }

    pub fn has_current(&self) -> bool {
        self.sequence.exists(self.position)
    }

    pub fn current_key(&self) -> usize {
        self.position
    }
}

impl<'a, S: SequenceAdapter> Iterator for Cursor<'a, S> {
    type Item = &'a S::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.current()?;
        self.advance();
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wsdl_record;

    wsdl_record! {
        pub struct Recipient = "RecipientType" {
            attr "uid" => uid: Option<u32>,
            text "number" => number: String,
        }
    }

    wsdl_record! {
        pub struct Recipients = "RecipientsType" {
            array "recipient" => recipients: Recipient,
        }
    }

    fn recipient(number: &str) -> Recipient {
        Recipient {
            number: number.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn plain_records_are_not_sequences() {
        let record = recipient("614");
        assert_eq!(record.count(), -1);
        assert!(!record.exists(0));
        assert!(record.get(0).is_none());
        assert!(record.to_send().is_none());
        assert!(!record.is_sequence());
    }

    #[test]
    fn empty_carrier_counts_zero() {
        let recipients = Recipients::default();
        assert_eq!(recipients.count(), 0);
        assert!(recipients.is_sequence());
        assert!(!recipients.exists(0));
        assert!(recipients.first().is_none());
    }

    #[test]
    fn add_then_get_last() {
        let mut recipients = Recipients::default();
        for (n, number) in ["1", "2", "3"].iter().enumerate() {
            assert!(recipients.add(recipient(number)));
            assert_eq!(recipients.count(), n as isize + 1);
            let last = recipients.get(recipients.count() as usize - 1).unwrap();
            assert_eq!(last.number, *number);
        }

        assert!(recipients.exists(2));
        assert!(!recipients.exists(3));
        assert!(recipients.item(3).is_none());
        assert_eq!(recipients.first().unwrap().number, "1");
        assert_eq!(recipients.last().unwrap().number, "3");
        assert_eq!(recipients.length(), 3);
    }

    #[test]
    fn to_send_keeps_insertion_order() {
        let mut recipients = Recipients::default();
        recipients.add(recipient("a"));
        recipients.add(recipient("b"));
        recipients.add(recipient("c"));

        let numbers: Vec<&str> = recipients
            .to_send()
            .unwrap()
            .iter()
            .map(|r| r.number.as_str())
            .collect();
        assert_eq!(numbers, vec!["a", "b", "c"]);
    }

    #[test]
    fn cursor_replays_after_rewind() {
        let recipients =
            Recipients::from_items(vec![recipient("1"), recipient("2"), recipient("3")]);
        let mut cursor = recipients.cursor();

        let mut first_pass = Vec::new();
        while cursor.has_current() {
            first_pass.push((cursor.current_key(), cursor.current().unwrap().number.clone()));
            cursor.advance();
        }
        assert_eq!(first_pass.len(), 3);
        assert!(cursor.current().is_none());

        cursor.rewind();
        let second_pass: Vec<String> = cursor.map(|r| r.number.clone()).collect();
        assert_eq!(second_pass, vec!["1", "2", "3"]);
        assert_eq!(first_pass[2], (2, "3".to_string()));
    }
}
