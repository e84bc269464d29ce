// Copyright (c) 2013-2017 Sandstorm Development Group, Inc. and contributors
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.


//! Typed views over the envelopes of the Cap'n Proto RPC protocol (`rpc.capnp`).
//!
//! The views sit directly on the `capnp` crate's layout engine. Field offsets,
//! pointer indices and union discriminants follow the schema exactly, so these
//! views interoperate with any other implementation of the protocol. Every
//! union writer sets the discriminant before touching the variant's payload.

use capnp::any_pointer;
use capnp::private::layout::{PointerBuilder, StructBuilder, StructReader, StructSize};
use capnp::traits::{FromPointerBuilder, FromPointerReader};
use capnp::Result;

/// Names an RPC struct so that it can be used as a list element.
pub trait OwnedStruct {
    const STRUCT_SIZE: StructSize;
    type Reader<'a>: From<StructReader<'a>>;
    type Builder<'a>: From<StructBuilder<'a>>;
}

#[doc(hidden)]
pub trait IntoStructReader<'a> {
    fn into_struct_reader(self) -> StructReader<'a>;
}

/// Boilerplate shared by every struct view: `STRUCT_SIZE`, `Owned`, and the
/// `Reader` / `Builder` types with their trait impls.
macro_rules! struct_views {
    ($data:expr, $pointers:expr) => {
        #[allow(unused_imports)]
        use capnp::private::layout::{
            PointerBuilder, PointerReader, StructBuilder, StructReader, StructSize,
        };
        #[allow(unused_imports)]
        use capnp::traits::{FromPointerBuilder, FromPointerReader};
        #[allow(unused_imports)]
        use capnp::{any_pointer, NotInSchema, Result};

        pub const STRUCT_SIZE: StructSize = StructSize {
            data: $data,
            pointers: $pointers,
        };

        #[derive(Copy, Clone)]
        pub struct Owned(());

        impl crate::rpc_capnp::OwnedStruct for Owned {
            const STRUCT_SIZE: StructSize = STRUCT_SIZE;
            type Reader<'a> = Reader<'a>;
            type Builder<'a> = Builder<'a>;
        }

        #[derive(Copy, Clone)]
        pub struct Reader<'a> {
            reader: StructReader<'a>,
        }

        impl<'a> From<StructReader<'a>> for Reader<'a> {
            fn from(reader: StructReader<'a>) -> Self {
                Self { reader }
            }
        }

        impl<'a> crate::rpc_capnp::IntoStructReader<'a> for Reader<'a> {
            fn into_struct_reader(self) -> StructReader<'a> {
                self.reader
            }
        }

        impl<'a> FromPointerReader<'a> for Reader<'a> {
            fn get_from_pointer(
                reader: &PointerReader<'a>,
                default: Option<&'a [capnp::Word]>,
            ) -> Result<Self> {
                Ok(reader.get_struct(default)?.into())
            }
        }

        impl Reader<'_> {
            pub fn reborrow(&self) -> Reader<'_> {
                Reader {
                    reader: self.reader,
                }
            }
        }

        pub struct Builder<'a> {
            builder: StructBuilder<'a>,
        }

        impl<'a> From<StructBuilder<'a>> for Builder<'a> {
            fn from(builder: StructBuilder<'a>) -> Self {
                Self { builder }
            }
        }

        impl<'a> FromPointerBuilder<'a> for Builder<'a> {
            fn init_pointer(builder: PointerBuilder<'a>, _size: u32) -> Self {
                builder.init_struct(STRUCT_SIZE).into()
            }

            fn get_from_pointer(
                builder: PointerBuilder<'a>,
                default: Option<&'a [capnp::Word]>,
            ) -> Result<Self> {
                Ok(builder.get_struct(STRUCT_SIZE, default)?.into())
            }
        }

        impl<'a> Builder<'a> {
            pub fn reborrow(&mut self) -> Builder<'_> {
                Builder {
                    builder: self.builder.reborrow(),
                }
            }

            pub fn reborrow_as_reader(&self) -> Reader<'_> {
                self.builder.as_reader().into()
            }

            pub fn into_reader(self) -> Reader<'a> {
                self.builder.into_reader().into()
            }
        }
    };
}

/// Sets the discriminant at `offset` to `tag`, then hands out the payload pointer.
fn union_pointer(
    builder: StructBuilder<'_>,
    offset: usize,
    tag: u16,
    index: usize,
) -> PointerBuilder<'_> {
    builder.set_data_field::<u16>(offset, tag);
    builder.get_pointer_field(index)
}

fn init_union_field<'a, T: FromPointerBuilder<'a>>(
    builder: StructBuilder<'a>,
    offset: usize,
    tag: u16,
    index: usize,
) -> T {
    FromPointerBuilder::init_pointer(union_pointer(builder, offset, tag, index), 0)
}

fn set_union_field<'a>(
    builder: StructBuilder<'_>,
    offset: usize,
    tag: u16,
    index: usize,
    value: impl IntoStructReader<'a>,
) -> Result<()> {
    union_pointer(builder, offset, tag, index).set_struct(&value.into_struct_reader(), false)
}

fn init_any_union_field(
    builder: StructBuilder<'_>,
    offset: usize,
    tag: u16,
    index: usize,
) -> any_pointer::Builder<'_> {
    init_any_field(union_pointer(builder, offset, tag, index))
}

fn init_any_field(pointer: PointerBuilder<'_>) -> any_pointer::Builder<'_> {
    let mut result = any_pointer::Builder::new(pointer);
    result.clear();
    result
}

fn get_field<'a, T: FromPointerReader<'a>>(reader: StructReader<'a>, index: usize) -> Result<T> {
    FromPointerReader::get_from_pointer(&reader.get_pointer_field(index), None)
}

fn set_field<'a>(
    builder: StructBuilder<'_>,
    index: usize,
    value: impl IntoStructReader<'a>,
) -> Result<()> {
    builder
        .get_pointer_field(index)
        .set_struct(&value.into_struct_reader(), false)
}

/// Fixed-length lists of RPC structs (`Payload.capTable`, `PromisedAnswer.transform`).
pub mod struct_list {
    use super::OwnedStruct;
    use capnp::private::layout::{
        ElementSize, ListBuilder, ListReader, PointerBuilder, PointerReader,
    };
    use capnp::traits::{FromPointerBuilder, FromPointerReader, IndexMove, ListIter};
    use capnp::Result;
    use std::marker::PhantomData;

    pub struct Reader<'a, T> {
        marker: PhantomData<T>,
        reader: ListReader<'a>,
    }

    impl<T> Clone for Reader<'_, T> {
        fn clone(&self) -> Self {
            *self
        }
    }

    impl<T> Copy for Reader<'_, T> {}

    impl<'a, T: OwnedStruct> Reader<'a, T> {
        pub fn len(&self) -> u32 {
            self.reader.len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        pub fn iter(self) -> ListIter<Reader<'a, T>, T::Reader<'a>> {
            ListIter::new(self, self.len())
        }

        /// Panics if `index` is out of range. See [`Reader::try_get`].
        pub fn get(self, index: u32) -> T::Reader<'a> {
            assert!(index < self.len());
            self.reader.get_struct_element(index).into()
        }

        pub fn try_get(self, index: u32) -> Option<T::Reader<'a>> {
            if index < self.len() {
                Some(self.reader.get_struct_element(index).into())
            } else {
                None
            }
        }
    }

    impl<'a, T: OwnedStruct> IndexMove<u32, T::Reader<'a>> for Reader<'a, T> {
        fn index_move(&self, index: u32) -> T::Reader<'a> {
            self.reader.get_struct_element(index).into()
        }
    }

    impl<'a, T: OwnedStruct> IntoIterator for Reader<'a, T> {
        type Item = T::Reader<'a>;
        type IntoIter = ListIter<Reader<'a, T>, T::Reader<'a>>;

        fn into_iter(self) -> Self::IntoIter {
            self.iter()
        }
    }

    impl<'a, T: OwnedStruct> FromPointerReader<'a> for Reader<'a, T> {
        fn get_from_pointer(
            reader: &PointerReader<'a>,
            default: Option<&'a [capnp::Word]>,
        ) -> Result<Self> {
            Ok(Reader {
                marker: PhantomData,
                reader: reader.get_list(ElementSize::InlineComposite, default)?,
            })
        }
    }

    pub struct Builder<'a, T> {
        marker: PhantomData<T>,
        builder: ListBuilder<'a>,
    }

    impl<'a, T: OwnedStruct> Builder<'a, T> {
        pub fn len(&self) -> u32 {
            self.builder.len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        pub fn reborrow(&mut self) -> Builder<'_, T> {
            Builder {
                marker: PhantomData,
                builder: self.builder.reborrow(),
            }
        }

        pub fn into_reader(self) -> Reader<'a, T> {
            Reader {
                marker: PhantomData,
                reader: self.builder.into_reader(),
            }
        }

        /// Panics if `index` is out of range.
        pub fn get(self, index: u32) -> T::Builder<'a> {
            assert!(index < self.len());
            self.builder.get_struct_element(index).into()
        }
    }

    impl<'a, T: OwnedStruct> FromPointerBuilder<'a> for Builder<'a, T> {
        fn init_pointer(builder: PointerBuilder<'a>, size: u32) -> Self {
            Builder {
                marker: PhantomData,
                builder: builder.init_struct_list(size, T::STRUCT_SIZE),
            }
        }

        fn get_from_pointer(
            builder: PointerBuilder<'a>,
            default: Option<&'a [capnp::Word]>,
        ) -> Result<Self> {
            Ok(Builder {
                marker: PhantomData,
                builder: builder.get_struct_list(T::STRUCT_SIZE, default)?,
            })
        }
    }
}

pub mod message {
    use super::{
        accept, bootstrap, call, disembargo, exception, finish, join, provide, release, resolve,
        return_,
    };

    struct_views!(1, 1);

    pub use self::Which::{
        Abort, Accept, Bootstrap, Call, Disembargo, Finish, Join, ObsoleteDelete, ObsoleteSave,
        Provide, Release, Resolve, Return, Unimplemented,
    };

    pub enum Which<'a> {
        Unimplemented(Result<Reader<'a>>),
        Abort(Result<exception::Reader<'a>>),
        Call(Result<call::Reader<'a>>),
        Return(Result<return_::Reader<'a>>),
        Finish(Result<finish::Reader<'a>>),
        Resolve(Result<resolve::Reader<'a>>),
        Release(Result<release::Reader<'a>>),
        ObsoleteSave(any_pointer::Reader<'a>),
        Bootstrap(Result<bootstrap::Reader<'a>>),
        ObsoleteDelete(any_pointer::Reader<'a>),
        Provide(Result<provide::Reader<'a>>),
        Accept(Result<accept::Reader<'a>>),
        Join(Result<join::Reader<'a>>),
        Disembargo(Result<disembargo::Reader<'a>>),
    }

    impl<'a> Reader<'a> {
        /// The raw discriminant, including values this crate does not know.
        pub fn which_tag(self) -> u16 {
            self.reader.get_data_field::<u16>(0)
        }

        #[inline]
        pub fn which(self) -> ::std::result::Result<Which<'a>, NotInSchema> {
            let payload = self.reader.get_pointer_field(0);
            match self.which_tag() {
                0 => Ok(Unimplemented(FromPointerReader::get_from_pointer(&payload, None))),
                1 => Ok(Abort(FromPointerReader::get_from_pointer(&payload, None))),
                2 => Ok(Call(FromPointerReader::get_from_pointer(&payload, None))),
                3 => Ok(Return(FromPointerReader::get_from_pointer(&payload, None))),
                4 => Ok(Finish(FromPointerReader::get_from_pointer(&payload, None))),
                5 => Ok(Resolve(FromPointerReader::get_from_pointer(&payload, None))),
                6 => Ok(Release(FromPointerReader::get_from_pointer(&payload, None))),
                7 => Ok(ObsoleteSave(any_pointer::Reader::new(payload))),
                8 => Ok(Bootstrap(FromPointerReader::get_from_pointer(&payload, None))),
                9 => Ok(ObsoleteDelete(any_pointer::Reader::new(payload))),
                10 => Ok(Provide(FromPointerReader::get_from_pointer(&payload, None))),
                11 => Ok(Accept(FromPointerReader::get_from_pointer(&payload, None))),
                12 => Ok(Join(FromPointerReader::get_from_pointer(&payload, None))),
                13 => Ok(Disembargo(FromPointerReader::get_from_pointer(&payload, None))),
                x => Err(NotInSchema(x)),
            }
        }

        fn has_variant(self, tag: u16) -> bool {
            self.which_tag() == tag && !self.reader.get_pointer_field(0).is_null()
        }

        pub fn has_unimplemented(self) -> bool {
            self.has_variant(0)
        }
        pub fn has_abort(self) -> bool {
            self.has_variant(1)
        }
        pub fn has_call(self) -> bool {
            self.has_variant(2)
        }
        pub fn has_return(self) -> bool {
            self.has_variant(3)
        }
        pub fn has_finish(self) -> bool {
            self.has_variant(4)
        }
        pub fn has_resolve(self) -> bool {
            self.has_variant(5)
        }
        pub fn has_release(self) -> bool {
            self.has_variant(6)
        }
        pub fn has_obsolete_save(self) -> bool {
            self.has_variant(7)
        }
        pub fn has_bootstrap(self) -> bool {
            self.has_variant(8)
        }
        pub fn has_obsolete_delete(self) -> bool {
            self.has_variant(9)
        }
        pub fn has_provide(self) -> bool {
            self.has_variant(10)
        }
        pub fn has_accept(self) -> bool {
            self.has_variant(11)
        }
        pub fn has_join(self) -> bool {
            self.has_variant(12)
        }
        pub fn has_disembargo(self) -> bool {
            self.has_variant(13)
        }
    }

    impl<'a> Builder<'a> {
        /// Echoes a message this vat could not interpret. The message is deep-copied.
        pub fn set_unimplemented(&mut self, value: Reader<'_>) -> Result<()> {
            super::set_union_field(self.builder.reborrow(), 0, 0, 0, value)
        }
        pub fn init_abort(self) -> exception::Builder<'a> {
            super::init_union_field(self.builder, 0, 1, 0)
        }
        pub fn set_abort(&mut self, value: exception::Reader<'_>) -> Result<()> {
            super::set_union_field(self.builder.reborrow(), 0, 1, 0, value)
        }
        pub fn init_call(self) -> call::Builder<'a> {
            super::init_union_field(self.builder, 0, 2, 0)
        }
        pub fn set_call(&mut self, value: call::Reader<'_>) -> Result<()> {
            super::set_union_field(self.builder.reborrow(), 0, 2, 0, value)
        }
        pub fn init_return(self) -> return_::Builder<'a> {
            super::init_union_field(self.builder, 0, 3, 0)
        }
        pub fn set_return(&mut self, value: return_::Reader<'_>) -> Result<()> {
            super::set_union_field(self.builder.reborrow(), 0, 3, 0, value)
        }
        pub fn init_finish(self) -> finish::Builder<'a> {
            super::init_union_field(self.builder, 0, 4, 0)
        }
        pub fn init_resolve(self) -> resolve::Builder<'a> {
            super::init_union_field(self.builder, 0, 5, 0)
        }
        pub fn init_release(self) -> release::Builder<'a> {
            super::init_union_field(self.builder, 0, 6, 0)
        }
        /// Only for interoperating with old peers; never produced by this crate's callers.
        pub fn init_obsolete_save(self) -> any_pointer::Builder<'a> {
            super::init_any_union_field(self.builder, 0, 7, 0)
        }
        pub fn init_bootstrap(self) -> bootstrap::Builder<'a> {
            super::init_union_field(self.builder, 0, 8, 0)
        }
        pub fn init_obsolete_delete(self) -> any_pointer::Builder<'a> {
            super::init_any_union_field(self.builder, 0, 9, 0)
        }
        pub fn init_provide(self) -> provide::Builder<'a> {
            super::init_union_field(self.builder, 0, 10, 0)
        }
        pub fn init_accept(self) -> accept::Builder<'a> {
            super::init_union_field(self.builder, 0, 11, 0)
        }
        pub fn init_join(self) -> join::Builder<'a> {
            super::init_union_field(self.builder, 0, 12, 0)
        }
        pub fn init_disembargo(self) -> disembargo::Builder<'a> {
            super::init_union_field(self.builder, 0, 13, 0)
        }

        pub fn which_tag(&self) -> u16 {
            self.builder.get_data_field::<u16>(0)
        }
    }

    impl ::std::fmt::Debug for Reader<'_> {
        fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
            match self.which() {
                Ok(Unimplemented(_)) => write!(f, "unimplemented"),
                Ok(Abort(Ok(e))) => write!(f, "abort({:?}: {:?})", e.get_type(), e.get_reason()),
                Ok(Call(Ok(c))) => write!(
                    f,
                    "call(question: {}, interface: {:#x}, method: {})",
                    c.get_question_id(),
                    c.get_interface_id(),
                    c.get_method_id()
                ),
                Ok(Return(Ok(r))) => write!(f, "return(answer: {})", r.get_answer_id()),
                Ok(Finish(Ok(fin))) => write!(f, "finish(question: {})", fin.get_question_id()),
                Ok(Resolve(Ok(r))) => write!(f, "resolve(promise: {})", r.get_promise_id()),
                Ok(Release(Ok(r))) => write!(
                    f,
                    "release(id: {}, count: {})",
                    r.get_id(),
                    r.get_reference_count()
                ),
                Ok(ObsoleteSave(_)) => write!(f, "obsoleteSave"),
                Ok(Bootstrap(Ok(b))) => write!(f, "bootstrap(question: {})", b.get_question_id()),
                Ok(ObsoleteDelete(_)) => write!(f, "obsoleteDelete"),
                Ok(Provide(Ok(p))) => write!(f, "provide(question: {})", p.get_question_id()),
                Ok(Accept(Ok(a))) => write!(f, "accept(question: {})", a.get_question_id()),
                Ok(Join(Ok(j))) => write!(f, "join(question: {})", j.get_question_id()),
                Ok(Disembargo(Ok(_))) => write!(f, "disembargo"),
                Ok(_) => write!(f, "<malformed message>"),
                Err(NotInSchema(tag)) => write!(f, "<unknown message kind {tag}>"),
            }
        }
    }
}

pub mod bootstrap {

    struct_views!(1, 1);

    impl<'a> Reader<'a> {
        #[inline]
        pub fn get_question_id(self) -> u32 {
            self.reader.get_data_field::<u32>(0)
        }
        pub fn get_deprecated_object_id(self) -> any_pointer::Reader<'a> {
            any_pointer::Reader::new(self.reader.get_pointer_field(0))
        }
        pub fn has_deprecated_object_id(&self) -> bool {
            !self.reader.get_pointer_field(0).is_null()
        }
    }

    impl<'a> Builder<'a> {
        #[inline]
        pub fn get_question_id(&self) -> u32 {
            self.builder.get_data_field::<u32>(0)
        }
        #[inline]
        pub fn set_question_id(&mut self, value: u32) {
            self.builder.set_data_field::<u32>(0, value);
        }
        pub fn init_deprecated_object_id(self) -> any_pointer::Builder<'a> {
            super::init_any_field(self.builder.get_pointer_field(0))
        }
    }
}

pub mod call {
    use super::{message_target, payload};

    struct_views!(3, 3);

    impl<'a> Reader<'a> {
        #[inline]
        pub fn get_question_id(self) -> u32 {
            self.reader.get_data_field::<u32>(0)
        }
        #[inline]
        pub fn get_target(self) -> Result<message_target::Reader<'a>> {
            super::get_field(self.reader, 0)
        }
        pub fn has_target(&self) -> bool {
            !self.reader.get_pointer_field(0).is_null()
        }
        #[inline]
        pub fn get_interface_id(self) -> u64 {
            self.reader.get_data_field::<u64>(1)
        }
        #[inline]
        pub fn get_method_id(self) -> u16 {
            self.reader.get_data_field::<u16>(2)
        }
        #[inline]
        pub fn get_params(self) -> Result<payload::Reader<'a>> {
            super::get_field(self.reader, 1)
        }
        pub fn has_params(&self) -> bool {
            !self.reader.get_pointer_field(1).is_null()
        }
        #[inline]
        pub fn get_send_results_to(self) -> send_results_to::Reader<'a> {
            self.reader.into()
        }
        #[inline]
        pub fn get_allow_third_party_tail_call(self) -> bool {
            self.reader.get_bool_field(128)
        }
    }

    impl<'a> Builder<'a> {
        #[inline]
        pub fn get_question_id(&self) -> u32 {
            self.builder.get_data_field::<u32>(0)
        }
        #[inline]
        pub fn set_question_id(&mut self, value: u32) {
            self.builder.set_data_field::<u32>(0, value);
        }
        pub fn init_target(self) -> message_target::Builder<'a> {
            FromPointerBuilder::init_pointer(self.builder.get_pointer_field(0), 0)
        }
        pub fn get_target(self) -> Result<message_target::Builder<'a>> {
            FromPointerBuilder::get_from_pointer(self.builder.get_pointer_field(0), None)
        }
        pub fn set_target(&mut self, value: message_target::Reader<'_>) -> Result<()> {
            super::set_field(self.builder.reborrow(), 0, value)
        }
        #[inline]
        pub fn get_interface_id(&self) -> u64 {
            self.builder.get_data_field::<u64>(1)
        }
        #[inline]
        pub fn set_interface_id(&mut self, value: u64) {
            self.builder.set_data_field::<u64>(1, value);
        }
        #[inline]
        pub fn get_method_id(&self) -> u16 {
            self.builder.get_data_field::<u16>(2)
        }
        #[inline]
        pub fn set_method_id(&mut self, value: u16) {
            self.builder.set_data_field::<u16>(2, value);
        }
        pub fn init_params(self) -> payload::Builder<'a> {
            FromPointerBuilder::init_pointer(self.builder.get_pointer_field(1), 0)
        }
        pub fn get_params(self) -> Result<payload::Builder<'a>> {
            FromPointerBuilder::get_from_pointer(self.builder.get_pointer_field(1), None)
        }
        pub fn set_params(&mut self, value: payload::Reader<'_>) -> Result<()> {
            super::set_field(self.builder.reborrow(), 1, value)
        }
        #[inline]
        pub fn get_send_results_to(self) -> send_results_to::Builder<'a> {
            self.builder.into()
        }
        #[inline]
        pub fn get_allow_third_party_tail_call(&self) -> bool {
            self.builder.get_bool_field(128)
        }
        #[inline]
        pub fn set_allow_third_party_tail_call(&mut self, value: bool) {
            self.builder.set_bool_field(128, value);
        }
    }

    /// Where the callee should deliver the results.
    pub mod send_results_to {
        use capnp::any_pointer;
        use capnp::private::layout::{StructBuilder, StructReader};
        use capnp::NotInSchema;

        pub use self::Which::{Caller, ThirdParty, Yourself};

        pub enum Which<'a> {
            Caller(()),
            Yourself(()),
            ThirdParty(any_pointer::Reader<'a>),
        }

        #[derive(Copy, Clone)]
        pub struct Reader<'a> {
            reader: StructReader<'a>,
        }

        impl<'a> From<StructReader<'a>> for Reader<'a> {
            fn from(reader: StructReader<'a>) -> Self {
                Self { reader }
            }
        }

        impl<'a> Reader<'a> {
            pub fn has_third_party(&self) -> bool {
                self.reader.get_data_field::<u16>(3) == 2
                    && !self.reader.get_pointer_field(2).is_null()
            }

            #[inline]
            pub fn which(self) -> ::std::result::Result<Which<'a>, NotInSchema> {
                match self.reader.get_data_field::<u16>(3) {
                    0 => Ok(Caller(())),
                    1 => Ok(Yourself(())),
                    2 => Ok(ThirdParty(any_pointer::Reader::new(
                        self.reader.get_pointer_field(2),
                    ))),
                    x => Err(NotInSchema(x)),
                }
            }
        }

        pub struct Builder<'a> {
            builder: StructBuilder<'a>,
        }

        impl<'a> From<StructBuilder<'a>> for Builder<'a> {
            fn from(builder: StructBuilder<'a>) -> Self {
                Self { builder }
            }
        }

        impl<'a> Builder<'a> {
            #[inline]
            pub fn set_caller(&mut self, _value: ()) {
                self.builder.set_data_field::<u16>(3, 0);
            }
            #[inline]
            pub fn set_yourself(&mut self, _value: ()) {
                self.builder.set_data_field::<u16>(3, 1);
            }
            pub fn init_third_party(self) -> any_pointer::Builder<'a> {
                super::super::init_any_union_field(self.builder, 3, 2, 2)
            }
        }
    }
}

pub mod return_ {
    use super::{exception, payload};

    struct_views!(2, 1);

    pub use self::Which::{
        AcceptFromThirdParty, Canceled, Exception, Results, ResultsSentElsewhere,
        TakeFromOtherQuestion,
    };

    pub enum Which<'a> {
        Results(Result<payload::Reader<'a>>),
        Exception(Result<exception::Reader<'a>>),
        Canceled(()),
        ResultsSentElsewhere(()),
        TakeFromOtherQuestion(u32),
        AcceptFromThirdParty(any_pointer::Reader<'a>),
    }

    impl<'a> Reader<'a> {
        #[inline]
        pub fn get_answer_id(self) -> u32 {
            self.reader.get_data_field::<u32>(0)
        }
        /// Defaults to `true`.
        #[inline]
        pub fn get_release_param_caps(self) -> bool {
            !self.reader.get_bool_field(32)
        }
        pub fn has_results(&self) -> bool {
            self.reader.get_data_field::<u16>(3) == 0 && !self.reader.get_pointer_field(0).is_null()
        }
        pub fn has_exception(&self) -> bool {
            self.reader.get_data_field::<u16>(3) == 1 && !self.reader.get_pointer_field(0).is_null()
        }
        pub fn has_accept_from_third_party(&self) -> bool {
            self.reader.get_data_field::<u16>(3) == 5 && !self.reader.get_pointer_field(0).is_null()
        }

        #[inline]
        pub fn which(self) -> ::std::result::Result<Which<'a>, NotInSchema> {
            let payload = self.reader.get_pointer_field(0);
            match self.reader.get_data_field::<u16>(3) {
                0 => Ok(Results(FromPointerReader::get_from_pointer(&payload, None))),
                1 => Ok(Exception(FromPointerReader::get_from_pointer(&payload, None))),
                2 => Ok(Canceled(())),
                3 => Ok(ResultsSentElsewhere(())),
                4 => Ok(TakeFromOtherQuestion(self.reader.get_data_field::<u32>(2))),
                5 => Ok(AcceptFromThirdParty(any_pointer::Reader::new(payload))),
                x => Err(NotInSchema(x)),
            }
        }
    }

    impl<'a> Builder<'a> {
        #[inline]
        pub fn get_answer_id(&self) -> u32 {
            self.builder.get_data_field::<u32>(0)
        }
        #[inline]
        pub fn set_answer_id(&mut self, value: u32) {
            self.builder.set_data_field::<u32>(0, value);
        }
        #[inline]
        pub fn get_release_param_caps(&self) -> bool {
            !self.builder.get_bool_field(32)
        }
        #[inline]
        pub fn set_release_param_caps(&mut self, value: bool) {
            self.builder.set_bool_field(32, !value);
        }
        pub fn init_results(self) -> payload::Builder<'a> {
            super::init_union_field(self.builder, 3, 0, 0)
        }
        pub fn set_results(&mut self, value: payload::Reader<'_>) -> Result<()> {
            super::set_union_field(self.builder.reborrow(), 3, 0, 0, value)
        }
        pub fn init_exception(self) -> exception::Builder<'a> {
            super::init_union_field(self.builder, 3, 1, 0)
        }
        pub fn set_exception(&mut self, value: exception::Reader<'_>) -> Result<()> {
            super::set_union_field(self.builder.reborrow(), 3, 1, 0, value)
        }
        #[inline]
        pub fn set_canceled(&mut self, _value: ()) {
            self.builder.set_data_field::<u16>(3, 2);
        }
        #[inline]
        pub fn set_results_sent_elsewhere(&mut self, _value: ()) {
            self.builder.set_data_field::<u16>(3, 3);
        }
        #[inline]
        pub fn set_take_from_other_question(&mut self, value: u32) {
            self.builder.set_data_field::<u16>(3, 4);
            self.builder.set_data_field::<u32>(2, value);
        }
        pub fn init_accept_from_third_party(self) -> any_pointer::Builder<'a> {
            super::init_any_union_field(self.builder, 3, 5, 0)
        }
    }
}

pub mod finish {
    struct_views!(1, 0);

    impl Reader<'_> {
        #[inline]
        pub fn get_question_id(self) -> u32 {
            self.reader.get_data_field::<u32>(0)
        }
        /// Defaults to `true`.
        #[inline]
        pub fn get_release_result_caps(self) -> bool {
            !self.reader.get_bool_field(32)
        }
    }

    impl Builder<'_> {
        #[inline]
        pub fn get_question_id(&self) -> u32 {
            self.builder.get_data_field::<u32>(0)
        }
        #[inline]
        pub fn set_question_id(&mut self, value: u32) {
            self.builder.set_data_field::<u32>(0, value);
        }
        #[inline]
        pub fn get_release_result_caps(&self) -> bool {
            !self.builder.get_bool_field(32)
        }
        #[inline]
        pub fn set_release_result_caps(&mut self, value: bool) {
            self.builder.set_bool_field(32, !value);
        }
    }
}

pub mod resolve {
    use super::{cap_descriptor, exception};

    struct_views!(1, 1);

    pub use self::Which::{Cap, Exception};

    pub enum Which<'a> {
        Cap(Result<cap_descriptor::Reader<'a>>),
        Exception(Result<exception::Reader<'a>>),
    }

    impl<'a> Reader<'a> {
        #[inline]
        pub fn get_promise_id(self) -> u32 {
            self.reader.get_data_field::<u32>(0)
        }
        pub fn has_cap(&self) -> bool {
            self.reader.get_data_field::<u16>(2) == 0 && !self.reader.get_pointer_field(0).is_null()
        }
        pub fn has_exception(&self) -> bool {
            self.reader.get_data_field::<u16>(2) == 1 && !self.reader.get_pointer_field(0).is_null()
        }

        #[inline]
        pub fn which(self) -> ::std::result::Result<Which<'a>, NotInSchema> {
            let payload = self.reader.get_pointer_field(0);
            match self.reader.get_data_field::<u16>(2) {
                0 => Ok(Cap(FromPointerReader::get_from_pointer(&payload, None))),
                1 => Ok(Exception(FromPointerReader::get_from_pointer(&payload, None))),
                x => Err(NotInSchema(x)),
            }
        }
    }

    impl<'a> Builder<'a> {
        #[inline]
        pub fn get_promise_id(&self) -> u32 {
            self.builder.get_data_field::<u32>(0)
        }
        #[inline]
        pub fn set_promise_id(&mut self, value: u32) {
            self.builder.set_data_field::<u32>(0, value);
        }
        pub fn init_cap(self) -> cap_descriptor::Builder<'a> {
            super::init_union_field(self.builder, 2, 0, 0)
        }
        pub fn set_cap(&mut self, value: cap_descriptor::Reader<'_>) -> Result<()> {
            super::set_union_field(self.builder.reborrow(), 2, 0, 0, value)
        }
        pub fn init_exception(self) -> exception::Builder<'a> {
            super::init_union_field(self.builder, 2, 1, 0)
        }
        pub fn set_exception(&mut self, value: exception::Reader<'_>) -> Result<()> {
            super::set_union_field(self.builder.reborrow(), 2, 1, 0, value)
        }
    }
}

pub mod release {
    struct_views!(1, 0);

    impl Reader<'_> {
        #[inline]
        pub fn get_id(self) -> u32 {
            self.reader.get_data_field::<u32>(0)
        }
        #[inline]
        pub fn get_reference_count(self) -> u32 {
            self.reader.get_data_field::<u32>(1)
        }
    }

    impl Builder<'_> {
        #[inline]
        pub fn get_id(&self) -> u32 {
            self.builder.get_data_field::<u32>(0)
        }
        #[inline]
        pub fn set_id(&mut self, value: u32) {
            self.builder.set_data_field::<u32>(0, value);
        }
        #[inline]
        pub fn get_reference_count(&self) -> u32 {
            self.builder.get_data_field::<u32>(1)
        }
        #[inline]
        pub fn set_reference_count(&mut self, value: u32) {
            self.builder.set_data_field::<u32>(1, value);
        }
    }
}

pub mod disembargo {
    use super::message_target;

    struct_views!(1, 1);

    impl<'a> Reader<'a> {
        #[inline]
        pub fn get_target(self) -> Result<message_target::Reader<'a>> {
            super::get_field(self.reader, 0)
        }
        pub fn has_target(&self) -> bool {
            !self.reader.get_pointer_field(0).is_null()
        }
        #[inline]
        pub fn get_context(self) -> context::Reader<'a> {
            self.reader.into()
        }
    }

    impl<'a> Builder<'a> {
        pub fn init_target(self) -> message_target::Builder<'a> {
            FromPointerBuilder::init_pointer(self.builder.get_pointer_field(0), 0)
        }
        pub fn get_target(self) -> Result<message_target::Builder<'a>> {
            FromPointerBuilder::get_from_pointer(self.builder.get_pointer_field(0), None)
        }
        pub fn set_target(&mut self, value: message_target::Reader<'_>) -> Result<()> {
            super::set_field(self.builder.reborrow(), 0, value)
        }
        #[inline]
        pub fn get_context(self) -> context::Builder<'a> {
            self.builder.into()
        }
    }

    pub mod context {
        use capnp::private::layout::{StructBuilder, StructReader};
        use capnp::NotInSchema;

        pub use self::Which::{Accept, Provide, ReceiverLoopback, SenderLoopback};

        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub enum Which {
            SenderLoopback(u32),
            ReceiverLoopback(u32),
            Accept(()),
            Provide(u32),
        }

        #[derive(Copy, Clone)]
        pub struct Reader<'a> {
            reader: StructReader<'a>,
        }

        impl<'a> From<StructReader<'a>> for Reader<'a> {
            fn from(reader: StructReader<'a>) -> Self {
                Self { reader }
            }
        }

        impl Reader<'_> {
            #[inline]
            pub fn which(self) -> ::std::result::Result<Which, NotInSchema> {
                let id = self.reader.get_data_field::<u32>(0);
                match self.reader.get_data_field::<u16>(2) {
                    0 => Ok(SenderLoopback(id)),
                    1 => Ok(ReceiverLoopback(id)),
                    2 => Ok(Accept(())),
                    3 => Ok(Provide(id)),
                    x => Err(NotInSchema(x)),
                }
            }
        }

        pub struct Builder<'a> {
            builder: StructBuilder<'a>,
        }

        impl<'a> From<StructBuilder<'a>> for Builder<'a> {
            fn from(builder: StructBuilder<'a>) -> Self {
                Self { builder }
            }
        }

        impl Builder<'_> {
            #[inline]
            pub fn set_sender_loopback(&mut self, value: u32) {
                self.builder.set_data_field::<u16>(2, 0);
                self.builder.set_data_field::<u32>(0, value);
            }
            #[inline]
            pub fn set_receiver_loopback(&mut self, value: u32) {
                self.builder.set_data_field::<u16>(2, 1);
                self.builder.set_data_field::<u32>(0, value);
            }
            #[inline]
            pub fn set_accept(&mut self, _value: ()) {
                self.builder.set_data_field::<u16>(2, 2);
            }
            #[inline]
            pub fn set_provide(&mut self, value: u32) {
                self.builder.set_data_field::<u16>(2, 3);
                self.builder.set_data_field::<u32>(0, value);
            }
        }
    }
}

pub mod provide {
    use super::message_target;

    struct_views!(1, 2);

    impl<'a> Reader<'a> {
        #[inline]
        pub fn get_question_id(self) -> u32 {
            self.reader.get_data_field::<u32>(0)
        }
        #[inline]
        pub fn get_target(self) -> Result<message_target::Reader<'a>> {
            super::get_field(self.reader, 0)
        }
        pub fn has_target(&self) -> bool {
            !self.reader.get_pointer_field(0).is_null()
        }
        pub fn get_recipient(self) -> any_pointer::Reader<'a> {
            any_pointer::Reader::new(self.reader.get_pointer_field(1))
        }
        pub fn has_recipient(&self) -> bool {
            !self.reader.get_pointer_field(1).is_null()
        }
    }

    impl<'a> Builder<'a> {
        #[inline]
        pub fn get_question_id(&self) -> u32 {
            self.builder.get_data_field::<u32>(0)
        }
        #[inline]
        pub fn set_question_id(&mut self, value: u32) {
            self.builder.set_data_field::<u32>(0, value);
        }
        pub fn init_target(&mut self) -> message_target::Builder<'_> {
            FromPointerBuilder::init_pointer(self.builder.reborrow().get_pointer_field(0), 0)
        }
        pub fn set_target(&mut self, value: message_target::Reader<'_>) -> Result<()> {
            super::set_field(self.builder.reborrow(), 0, value)
        }
        pub fn init_recipient(self) -> any_pointer::Builder<'a> {
            super::init_any_field(self.builder.get_pointer_field(1))
        }
    }
}

pub mod accept {

    struct_views!(1, 1);

    impl<'a> Reader<'a> {
        #[inline]
        pub fn get_question_id(self) -> u32 {
            self.reader.get_data_field::<u32>(0)
        }
        pub fn get_provision(self) -> any_pointer::Reader<'a> {
            any_pointer::Reader::new(self.reader.get_pointer_field(0))
        }
        pub fn has_provision(&self) -> bool {
            !self.reader.get_pointer_field(0).is_null()
        }
        #[inline]
        pub fn get_embargo(self) -> bool {
            self.reader.get_bool_field(32)
        }
    }

    impl<'a> Builder<'a> {
        #[inline]
        pub fn get_question_id(&self) -> u32 {
            self.builder.get_data_field::<u32>(0)
        }
        #[inline]
        pub fn set_question_id(&mut self, value: u32) {
            self.builder.set_data_field::<u32>(0, value);
        }
        pub fn init_provision(&mut self) -> any_pointer::Builder<'_> {
            super::init_any_field(self.builder.reborrow().get_pointer_field(0))
        }
        #[inline]
        pub fn get_embargo(&self) -> bool {
            self.builder.get_bool_field(32)
        }
        #[inline]
        pub fn set_embargo(&mut self, value: bool) {
            self.builder.set_bool_field(32, value);
        }
    }
}

pub mod join {
    use super::message_target;

    struct_views!(1, 2);

    impl<'a> Reader<'a> {
        #[inline]
        pub fn get_question_id(self) -> u32 {
            self.reader.get_data_field::<u32>(0)
        }
        #[inline]
        pub fn get_target(self) -> Result<message_target::Reader<'a>> {
            super::get_field(self.reader, 0)
        }
        pub fn has_target(&self) -> bool {
            !self.reader.get_pointer_field(0).is_null()
        }
        pub fn get_key_part(self) -> any_pointer::Reader<'a> {
            any_pointer::Reader::new(self.reader.get_pointer_field(1))
        }
        pub fn has_key_part(&self) -> bool {
            !self.reader.get_pointer_field(1).is_null()
        }
    }

    impl<'a> Builder<'a> {
        #[inline]
        pub fn get_question_id(&self) -> u32 {
            self.builder.get_data_field::<u32>(0)
        }
        #[inline]
        pub fn set_question_id(&mut self, value: u32) {
            self.builder.set_data_field::<u32>(0, value);
        }
        pub fn init_target(&mut self) -> message_target::Builder<'_> {
            FromPointerBuilder::init_pointer(self.builder.reborrow().get_pointer_field(0), 0)
        }
        pub fn set_target(&mut self, value: message_target::Reader<'_>) -> Result<()> {
            super::set_field(self.builder.reborrow(), 0, value)
        }
        pub fn init_key_part(self) -> any_pointer::Builder<'a> {
            super::init_any_field(self.builder.get_pointer_field(1))
        }
    }
}

pub mod message_target {
    use super::promised_answer;

    struct_views!(1, 1);

    pub use self::Which::{ImportedCap, PromisedAnswer};

    pub enum Which<'a> {
        ImportedCap(u32),
        PromisedAnswer(Result<promised_answer::Reader<'a>>),
    }

    impl<'a> Reader<'a> {
        pub fn has_promised_answer(&self) -> bool {
            self.reader.get_data_field::<u16>(2) == 1 && !self.reader.get_pointer_field(0).is_null()
        }

        #[inline]
        pub fn which(self) -> ::std::result::Result<Which<'a>, NotInSchema> {
            match self.reader.get_data_field::<u16>(2) {
                0 => Ok(ImportedCap(self.reader.get_data_field::<u32>(0))),
                1 => Ok(PromisedAnswer(super::get_field(self.reader, 0))),
                x => Err(NotInSchema(x)),
            }
        }
    }

    impl<'a> Builder<'a> {
        #[inline]
        pub fn set_imported_cap(&mut self, value: u32) {
            self.builder.set_data_field::<u16>(2, 0);
            self.builder.set_data_field::<u32>(0, value);
        }
        pub fn init_promised_answer(self) -> promised_answer::Builder<'a> {
            super::init_union_field(self.builder, 2, 1, 0)
        }
        pub fn set_promised_answer(&mut self, value: promised_answer::Reader<'_>) -> Result<()> {
            super::set_union_field(self.builder.reborrow(), 2, 1, 0, value)
        }
    }
}

pub mod payload {
    use super::cap_descriptor;
    use super::struct_list;

    struct_views!(0, 2);

    impl<'a> Reader<'a> {
        /// Opaque to this layer; the method signature decides how to read it.
        pub fn get_content(self) -> any_pointer::Reader<'a> {
            any_pointer::Reader::new(self.reader.get_pointer_field(0))
        }
        pub fn has_content(&self) -> bool {
            !self.reader.get_pointer_field(0).is_null()
        }
        #[inline]
        pub fn get_cap_table(self) -> Result<struct_list::Reader<'a, cap_descriptor::Owned>> {
            super::get_field(self.reader, 1)
        }
        pub fn has_cap_table(&self) -> bool {
            !self.reader.get_pointer_field(1).is_null()
        }
    }

    impl<'a> Builder<'a> {
        pub fn init_content(&mut self) -> any_pointer::Builder<'_> {
            super::init_any_field(self.builder.reborrow().get_pointer_field(0))
        }
        pub fn get_content(&mut self) -> any_pointer::Builder<'_> {
            any_pointer::Builder::new(self.builder.reborrow().get_pointer_field(0))
        }
        /// The capability table has a fixed length once created.
        pub fn init_cap_table(self, size: u32) -> struct_list::Builder<'a, cap_descriptor::Owned> {
            FromPointerBuilder::init_pointer(self.builder.get_pointer_field(1), size)
        }
        pub fn get_cap_table(self) -> Result<struct_list::Builder<'a, cap_descriptor::Owned>> {
            FromPointerBuilder::get_from_pointer(self.builder.get_pointer_field(1), None)
        }
    }
}

pub mod cap_descriptor {
    use super::{promised_answer, third_party_cap_descriptor};

    struct_views!(1, 1);

    pub use self::Which::{
        None, ReceiverAnswer, ReceiverHosted, SenderHosted, SenderPromise, ThirdPartyHosted,
    };

    pub enum Which<'a> {
        None(()),
        SenderHosted(u32),
        SenderPromise(u32),
        ReceiverHosted(u32),
        ReceiverAnswer(Result<promised_answer::Reader<'a>>),
        ThirdPartyHosted(Result<third_party_cap_descriptor::Reader<'a>>),
    }

    impl<'a> Reader<'a> {
        pub fn has_receiver_answer(&self) -> bool {
            self.reader.get_data_field::<u16>(0) == 4 && !self.reader.get_pointer_field(0).is_null()
        }
        pub fn has_third_party_hosted(&self) -> bool {
            self.reader.get_data_field::<u16>(0) == 5 && !self.reader.get_pointer_field(0).is_null()
        }

        #[inline]
        pub fn which(self) -> ::std::result::Result<Which<'a>, NotInSchema> {
            let id = self.reader.get_data_field::<u32>(1);
            match self.reader.get_data_field::<u16>(0) {
                0 => Ok(None(())),
                1 => Ok(SenderHosted(id)),
                2 => Ok(SenderPromise(id)),
                3 => Ok(ReceiverHosted(id)),
                4 => Ok(ReceiverAnswer(super::get_field(self.reader, 0))),
                5 => Ok(ThirdPartyHosted(super::get_field(self.reader, 0))),
                x => Err(NotInSchema(x)),
            }
        }
    }

    impl<'a> Builder<'a> {
        #[inline]
        pub fn set_none(&mut self, _value: ()) {
            self.builder.set_data_field::<u16>(0, 0);
        }
        #[inline]
        pub fn set_sender_hosted(&mut self, value: u32) {
            self.builder.set_data_field::<u16>(0, 1);
            self.builder.set_data_field::<u32>(1, value);
        }
        #[inline]
        pub fn set_sender_promise(&mut self, value: u32) {
            self.builder.set_data_field::<u16>(0, 2);
            self.builder.set_data_field::<u32>(1, value);
        }
        #[inline]
        pub fn set_receiver_hosted(&mut self, value: u32) {
            self.builder.set_data_field::<u16>(0, 3);
            self.builder.set_data_field::<u32>(1, value);
        }
        pub fn init_receiver_answer(self) -> promised_answer::Builder<'a> {
            super::init_union_field(self.builder, 0, 4, 0)
        }
        pub fn init_third_party_hosted(self) -> third_party_cap_descriptor::Builder<'a> {
            super::init_union_field(self.builder, 0, 5, 0)
        }
    }
}

pub mod promised_answer {
    use super::struct_list;

    struct_views!(1, 1);

    impl<'a> Reader<'a> {
        #[inline]
        pub fn get_question_id(self) -> u32 {
            self.reader.get_data_field::<u32>(0)
        }
        /// Applied in order to the answer's content to reach the target.
        #[inline]
        pub fn get_transform(self) -> Result<struct_list::Reader<'a, op::Owned>> {
            super::get_field(self.reader, 0)
        }
        pub fn has_transform(&self) -> bool {
            !self.reader.get_pointer_field(0).is_null()
        }
    }

    impl<'a> Builder<'a> {
        #[inline]
        pub fn get_question_id(&self) -> u32 {
            self.builder.get_data_field::<u32>(0)
        }
        #[inline]
        pub fn set_question_id(&mut self, value: u32) {
            self.builder.set_data_field::<u32>(0, value);
        }
        pub fn init_transform(self, size: u32) -> struct_list::Builder<'a, op::Owned> {
            FromPointerBuilder::init_pointer(self.builder.get_pointer_field(0), size)
        }
        pub fn get_transform(self) -> Result<struct_list::Builder<'a, op::Owned>> {
            FromPointerBuilder::get_from_pointer(self.builder.get_pointer_field(0), None)
        }
    }

    pub mod op {
        struct_views!(1, 0);

        pub use self::Which::{GetPointerField, Noop};

        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub enum Which {
            Noop(()),
            GetPointerField(u16),
        }

        impl Reader<'_> {
            #[inline]
            pub fn which(self) -> ::std::result::Result<Which, NotInSchema> {
                match self.reader.get_data_field::<u16>(0) {
                    0 => Ok(Noop(())),
                    1 => Ok(GetPointerField(self.reader.get_data_field::<u16>(1))),
                    x => Err(NotInSchema(x)),
                }
            }
        }

        impl Builder<'_> {
            #[inline]
            pub fn set_noop(&mut self, _value: ()) {
                self.builder.set_data_field::<u16>(0, 0);
            }
            #[inline]
            pub fn set_get_pointer_field(&mut self, value: u16) {
                self.builder.set_data_field::<u16>(0, 1);
                self.builder.set_data_field::<u16>(1, value);
            }
        }
    }
}

pub mod third_party_cap_descriptor {

    struct_views!(1, 1);

    impl<'a> Reader<'a> {
        pub fn get_id(self) -> any_pointer::Reader<'a> {
            any_pointer::Reader::new(self.reader.get_pointer_field(0))
        }
        pub fn has_id(&self) -> bool {
            !self.reader.get_pointer_field(0).is_null()
        }
        #[inline]
        pub fn get_vine_id(self) -> u32 {
            self.reader.get_data_field::<u32>(0)
        }
    }

    impl<'a> Builder<'a> {
        pub fn init_id(&mut self) -> any_pointer::Builder<'_> {
            super::init_any_field(self.builder.reborrow().get_pointer_field(0))
        }
        #[inline]
        pub fn get_vine_id(&self) -> u32 {
            self.builder.get_data_field::<u32>(0)
        }
        #[inline]
        pub fn set_vine_id(&mut self, value: u32) {
            self.builder.set_data_field::<u32>(0, value);
        }
    }
}

pub mod exception {
    use capnp::traits::SetterInput;
    use capnp::{text, Error, ErrorKind};

    struct_views!(1, 1);

    #[repr(u16)]
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Type {
        Failed = 0,
        Overloaded = 1,
        Disconnected = 2,
        Unimplemented = 3,
    }

    impl Type {
        /// Whether a caller may retry without further knowledge of the application.
        pub fn is_retryable(self) -> bool {
            matches!(self, Type::Overloaded | Type::Disconnected)
        }
    }

    impl TryFrom<u16> for Type {
        type Error = NotInSchema;

        fn try_from(value: u16) -> ::std::result::Result<Self, NotInSchema> {
            match value {
                0 => Ok(Type::Failed),
                1 => Ok(Type::Overloaded),
                2 => Ok(Type::Disconnected),
                3 => Ok(Type::Unimplemented),
                n => Err(NotInSchema(n)),
            }
        }
    }

    impl From<Type> for u16 {
        #[inline]
        fn from(x: Type) -> u16 {
            x as u16
        }
    }

    impl<'a> Reader<'a> {
        #[inline]
        pub fn get_reason(self) -> Result<&'a str> {
            let text: text::Reader<'a> =
                FromPointerReader::get_from_pointer(&self.reader.get_pointer_field(0), None)?;
            Ok(text.to_str()?)
        }
        pub fn has_reason(&self) -> bool {
            !self.reader.get_pointer_field(0).is_null()
        }
        #[inline]
        pub fn get_type(self) -> ::std::result::Result<Type, NotInSchema> {
            Type::try_from(self.reader.get_data_field::<u16>(2))
        }
        #[inline]
        pub fn get_obsolete_is_callers_fault(self) -> bool {
            self.reader.get_bool_field(0)
        }
        #[inline]
        pub fn get_obsolete_durability(self) -> u16 {
            self.reader.get_data_field::<u16>(1)
        }

        /// Converts a received exception into a local error of the matching kind.
        pub fn to_error(self) -> Error {
            let (typ, reason) = match (self.get_type(), self.get_reason()) {
                (Ok(typ), Ok(reason)) => (typ, reason),
                _ => (Type::Failed, "(malformed error)"),
            };
            let description = format!("remote exception: {reason}");
            match typ {
                Type::Failed => Error::failed(description),
                Type::Overloaded => Error::overloaded(description),
                Type::Disconnected => Error::disconnected(description),
                Type::Unimplemented => Error::unimplemented(description),
            }
        }
    }

    impl Builder<'_> {
        pub fn set_reason<T: SetterInput<text::Owned>>(&mut self, value: T) -> Result<()> {
            let pointer = self.builder.reborrow().get_pointer_field(0);
            <T as SetterInput<text::Owned>>::set_pointer_builder(pointer, value, false)
        }
        #[inline]
        pub fn get_type(&self) -> ::std::result::Result<Type, NotInSchema> {
            Type::try_from(self.builder.get_data_field::<u16>(2))
        }
        #[inline]
        pub fn set_type(&mut self, value: Type) {
            self.builder.set_data_field::<u16>(2, value.into());
        }
        #[inline]
        pub fn set_obsolete_is_callers_fault(&mut self, value: bool) {
            self.builder.set_bool_field(0, value);
        }
        #[inline]
        pub fn set_obsolete_durability(&mut self, value: u16) {
            self.builder.set_data_field::<u16>(1, value);
        }

        /// Fills in the exception from a local error.
        pub fn set_from_error(&mut self, error: &Error) -> Result<()> {
            self.set_reason(&error.extra[..])?;
            let typ = match error.kind {
                ErrorKind::Overloaded => Type::Overloaded,
                ErrorKind::Disconnected => Type::Disconnected,
                ErrorKind::Unimplemented => Type::Unimplemented,
                _ => Type::Failed,
            };
            self.set_type(typ);
            Ok(())
        }
    }
}
