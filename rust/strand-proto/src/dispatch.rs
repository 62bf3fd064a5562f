use strand_common::{Result, error::Error, verify_data};
use strand_wire::{FieldKind, MessageSetItem, WireReader, WireType};

use crate::collector::FieldCollector;

/// Routes the field occurrences of each message to the collectors of the
/// requested fields.
///
/// Collectors are sorted by field number and matched against the tag
/// stream with a cursor that only moves forward while tags ascend, which is
/// the usual layout of serialized messages. A tag lower than the previous
/// one resets the cursor to the first collector, so descending tags cost a
/// rescan per occurrence but are still decoded correctly.
pub struct FieldDispatcher<'c, 'a> {
    collectors: &'c mut [FieldCollector<'a>],
    message_set_items: bool,
}

impl<'c, 'a> FieldDispatcher<'c, 'a> {
    /// `collectors` must be sorted by strictly ascending field number.
    pub fn new(
        collectors: &'c mut [FieldCollector<'a>],
        message_set_items: bool,
    ) -> Result<FieldDispatcher<'c, 'a>> {
        if !collectors
            .windows(2)
            .all(|w| w[0].field_number() < w[1].field_number())
        {
            return Err(Error::invalid_arg(
                "collectors",
                "collectors must be sorted by unique field number",
            ));
        }
        Ok(FieldDispatcher {
            collectors,
            message_set_items,
        })
    }

    /// Decodes one message, committing every requested value under
    /// `message_index`.
    ///
    /// The first error ends the message; values it already committed stay
    /// in the collectors (see [`save_lengths`](Self::save_lengths)).
    pub fn consume_message(&mut self, message: &'a [u8], message_index: i64) -> Result<()> {
        let mut reader = WireReader::new(message);
        let mut last_seen = 0u32;
        let mut next = 0usize;
        while let Some(tag) = reader.next_tag()? {
            if tag.wire_type == WireType::EndGroup {
                // The message was the contents of a group; the END_GROUP tag
                // must be the last thing in the buffer.
                verify_data!(end_group, reader.remaining_slice().is_empty());
                break;
            }

            if self.message_set_items && tag.is_message_set_item() {
                let contents: &'a [u8] = reader.read_value(FieldKind::Group)?;
                self.consume_message_set_item(contents, message_index)?;
                continue;
            }

            let number = tag.field_number;
            if number < last_seen {
                next = 0;
            }
            while next < self.collectors.len() && self.collectors[next].field_number() < number {
                next += 1;
            }
            last_seen = number;

            if let Some(collector) = self.collectors.get_mut(next) {
                if collector.field_number() == number {
                    collector.consume(&mut reader, message_index)?;
                }
            }
        }
        Ok(())
    }

    /// Dispatches the message of a message-set item to the collector whose
    /// field number equals the item's type id, if any.
    fn consume_message_set_item(&mut self, contents: &'a [u8], message_index: i64) -> Result<()> {
        let item = MessageSetItem::parse(contents)?;
        if let Some(collector) = self.find_collector(item.type_id) {
            let mut reader = item.message_reader();
            collector.consume(&mut reader, message_index)?;
        }
        Ok(())
    }

    fn find_collector(&mut self, number: u32) -> Option<&mut FieldCollector<'a>> {
        let pos = self
            .collectors
            .binary_search_by_key(&number, FieldCollector::field_number)
            .ok()?;
        self.collectors.get_mut(pos)
    }

    /// Records the current length of every collector into `lengths`.
    pub fn save_lengths(&self, lengths: &mut Vec<usize>) {
        lengths.clear();
        lengths.extend(self.collectors.iter().map(FieldCollector::len));
    }

    /// Drops every value committed since `lengths` were saved.
    pub fn restore_lengths(&mut self, lengths: &[usize]) {
        for (collector, &len) in self.collectors.iter_mut().zip(lengths) {
            collector.truncate(len);
        }
    }
}
