mod read_op;
pub mod row_mut;
pub mod view;
mod write_op;

pub use read_op::RowReadable;
pub use row_mut::RowMut;
pub use view::RowView;

#[cfg(test)]
mod tests;
