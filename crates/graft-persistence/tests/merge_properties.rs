//! Property tests for merge-on-load.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;

use graft_persistence::{FieldTable, Persistable, Persistence, TypeRegistry, accessor, merge};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Playlist {
    #[serde(skip)]
    file_name: String,
    title: String,
    plays: u32,
    tracks: Rc<RefCell<Vec<String>>>,
}

impl Persistable for Playlist {
    const TYPE_NAME: &'static str = "Playlist";

    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn set_file_name(&mut self, file_name: String) {
        self.file_name = file_name;
    }

    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<Playlist>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::builder()
                .ignored("file_name")
                .scalar("title", accessor!(Playlist, title))
                .scalar("plays", accessor!(Playlist, plays))
                .sequence("tracks", accessor!(Playlist, tracks))
                .build()
        })
    }
}

fn playlist(title: String, plays: u32, tracks: Vec<String>) -> Playlist {
    Playlist {
        title,
        plays,
        tracks: Rc::new(RefCell::new(tracks)),
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn merge_refills_in_place(
        before in prop::collection::vec(".*", 0..6),
        loaded in prop::collection::vec(".*", 0..6),
        title in ".*",
        plays in any::<u32>(),
    ) {
        let mut target = playlist(String::new(), 0, before);
        let handle = Rc::clone(&target.tracks);
        let image = playlist(title.clone(), plays, loaded.clone());

        merge(&mut target, &image);

        prop_assert!(Rc::ptr_eq(&handle, &target.tracks));
        prop_assert_eq!(&*handle.borrow(), &loaded);
        prop_assert_eq!(target.title, title);
        prop_assert_eq!(target.plays, plays);
    }

    #[test]
    fn string_round_trip_restores_values(
        title in "[a-z]{1,12}",
        plays in any::<u32>(),
        tracks in prop::collection::vec("[a-z]{1,8}", 0..6),
    ) {
        let persistence = Persistence::new(TypeRegistry::new());
        let mut saved = playlist(title.clone(), plays, tracks.clone());
        let mut buffer = String::new();
        prop_assert!(persistence.save_to_string(&mut saved, &mut buffer));

        let mut live = Playlist::default();
        let handle = Rc::clone(&live.tracks);
        prop_assert!(persistence.load_from_string(&mut live, Some(&buffer)));

        prop_assert_eq!(live.title, title);
        prop_assert_eq!(live.plays, plays);
        prop_assert!(Rc::ptr_eq(&handle, &live.tracks));
        prop_assert_eq!(&*handle.borrow(), &tracks);
    }
}
