mod file;
mod habits;

pub use file::FileStore;
#[allow(unused_imports)]
pub use file::{KeyValueStore, StorageError};
pub use habits::{today_key, HabitError, HabitStore};
#[allow(unused_imports)]
pub use habits::{storage_key, HabitView, LoadedHabits};
