pub mod telegram_polling;

pub use telegram_polling::CommandService;
