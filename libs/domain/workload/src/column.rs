/// A single column as discovered by catalog introspection: name,
/// declared type, nullability, default presence, and whether it is
/// auto-generated. Insertion order mirrors ordinal position.
pub use pgload_db::introspect::IntrospectedColumn as ColumnDescriptor;
