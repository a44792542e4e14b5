use crate::state::events::Event;

/// A Message carrying an Event from game state to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub event: Event,
}

impl Message {
    fn new(event: Event) -> Self {
        Message { event }
    }
}

pub trait MessageHandler {
    fn handle_message(&mut self, message: &Message);
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    pub messages: Vec<Message>,
}

impl Dispatcher {
    pub fn broadcast(&mut self, event: Event) {
        self.messages.push(Message::new(event));
    }

    pub fn dispatch(messages: &[Message], handler: &mut dyn MessageHandler) {
        for m in messages {
            handler.handle_message(m);
        }
    }

    /// Returns the current message buffer, and clears it.
    pub fn drain(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod dispatch_tests {
    use super::*;
    use crate::audio::Sfx;

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
    }

    impl MessageHandler for Recorder {
        fn handle_message(&mut self, message: &Message) {
            self.events.push(message.event.clone());
        }
    }

    #[test]
    fn drain_preserves_order_and_empties() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.broadcast(Event::PlaySound(Sfx::Coin));
        dispatcher.broadcast(Event::CoinCollected { total: 1 });

        let messages = dispatcher.drain();
        assert!(dispatcher.is_empty());

        let mut recorder = Recorder::default();
        Dispatcher::dispatch(&messages, &mut recorder);
        assert_eq!(
            recorder.events,
            vec![
                Event::PlaySound(Sfx::Coin),
                Event::CoinCollected { total: 1 }
            ]
        );
    }
}
