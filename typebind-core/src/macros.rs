/// Implement [`Reflect`](crate::Reflect) for a struct with named fields.
///
/// Every listed field is serialized under its own name. The struct gets a
/// blank form built from its fields' zero values, so it can be decoded
/// even without a constructor. Append `, default` to use the
/// [`Default`] impl as the parameterless constructor, and use
/// `Type as RAW { .. }` to supply a hand-written [`RawType`](crate::RawType)
/// static, for example to declare supertypes.
///
/// ```
/// use typebind_core::{reflect_struct, Reflect, TypeDescriptor};
///
/// pub struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// reflect_struct!(Point { x: i32, y: i32 });
///
/// let point = Point::blank().unwrap();
/// assert_eq!((point.x, point.y), (0, 0));
/// assert_eq!(TypeDescriptor::of::<Point>().unwrap().to_string(), "Point");
/// ```
#[macro_export]
macro_rules! reflect_struct {
    (@construct default) => {
        fn construct() -> ::core::option::Option<Self> {
            ::core::option::Option::Some(<Self as $crate::__private::Default>::default())
        }
    };

    (@impl $ty:ident, $raw:expr, { $($field:ident : $fty:ty),* } $(, $opt:ident)*) => {
        impl $crate::Reflect for $ty {
            fn type_shape() -> $crate::TypeShape {
                $crate::TypeShape::Raw($raw)
            }

            fn type_ops() -> ::core::option::Option<$crate::TypeOps> {
                ::core::option::Option::Some($crate::TypeOps::of::<Self>($crate::Def::Struct(
                    $crate::StructOps {
                        fields: || $crate::__private::vec![$(
                            $crate::FieldDef {
                                name: ::core::stringify!($field),
                                descriptor: $crate::TypeDescriptor::of::<$fty>,
                                get: |value| {
                                    let value = value.downcast_ref::<$ty>()?;
                                    ::core::option::Option::Some(
                                        <$fty as $crate::Reflect>::as_instance(&value.$field),
                                    )
                                },
                                set: |value, field| {
                                    let found = value.type_name();
                                    let target = value
                                        .as_any_mut()
                                        .downcast_mut::<$ty>()
                                        .ok_or_else(|| $crate::TypeMismatch::expected::<$ty>(found))?;
                                    target.$field = <$fty as $crate::Reflect>::from_instance(field)?;
                                    ::core::result::Result::Ok(())
                                },
                            }
                        ),*],
                    },
                )))
            }

            fn blank() -> ::core::option::Option<Self> {
                ::core::option::Option::Some($ty {
                    $($field: <$fty as $crate::Reflect>::blank()?,)*
                })
            }

            $($crate::reflect_struct!(@construct $opt);)*
        }
    };

    ($ty:ident as $raw:path { $($field:ident : $fty:ty),* $(,)? } $(, $opt:ident)*) => {
        $crate::reflect_struct!(@impl $ty, &$raw, { $($field : $fty),* } $(, $opt)*);
    };

    ($ty:ident { $($field:ident : $fty:ty),* $(,)? } $(, $opt:ident)*) => {
        $crate::reflect_struct!(@impl $ty, {
            static RAW: $crate::RawType = $crate::RawType::concrete::<$ty>(::core::stringify!($ty));
            &RAW
        }, { $($field : $fty),* } $(, $opt)*);
    };
}
