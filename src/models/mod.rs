pub mod catalog;
pub mod inventory;

pub use catalog::{Categoria, Color, NewProduct, NewSupplier, Producto, Proveedor, Talla};
pub use inventory::{
    IntakeCommand, IntakeReceipt, InventarioRow, InventoryKey, MovementType, PrecioHistorialRow,
    WithdrawalCommand, WithdrawalReceipt,
};
