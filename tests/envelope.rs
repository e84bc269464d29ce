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


use capnp::any_pointer;
use capnp::message::ReaderOptions;
use capnp::serialize::{self, OwnedSegments};
use capnp::{ErrorKind, NotInSchema};
use capnp_rpc_transport::rpc_capnp::{
    call, cap_descriptor, disembargo, exception, message, message_target, promised_answer,
    release, resolve, return_,
};
use quickcheck::{quickcheck, TestResult};

type Frame = capnp::message::Reader<OwnedSegments>;

/// Builds an envelope, frames it, and parses the frame back.
fn round_trip(
    build: impl FnOnce(message::Builder<'_>) -> capnp::Result<()>,
) -> capnp::Result<Frame> {
    let mut builder = capnp::message::Builder::new_default();
    build(builder.init_root())?;
    let bytes = serialize::write_message_to_words(&builder);
    let mut slice = &bytes[..];
    let frame = serialize::read_message(&mut slice, ReaderOptions::new())?;
    assert!(slice.is_empty());
    Ok(frame)
}

/// Opaque pointer fields hold application structs; a `Release` stands in for one.
fn set_opaque(pointer: any_pointer::Builder<'_>, tag: u32) {
    pointer.init_as::<release::Builder<'_>>().set_id(tag);
}

fn opaque(pointer: any_pointer::Reader<'_>) -> capnp::Result<u32> {
    Ok(pointer.get_as::<release::Reader<'_>>()?.get_id())
}

fn root(frame: &Frame) -> capnp::Result<message::Reader<'_>> {
    frame.get_root()
}

#[test]
fn return_with_exception() -> capnp::Result<()> {
    let frame = round_trip(|m| {
        let mut ret = m.init_return();
        ret.set_answer_id(7);
        let mut exc = ret.init_exception();
        exc.set_type(exception::Type::Failed);
        exc.set_reason("boom")?;
        Ok(())
    })?;
    match root(&frame)?.which()? {
        message::Return(ret) => {
            let ret = ret?;
            assert_eq!(ret.get_answer_id(), 7);
            assert!(ret.get_release_param_caps());
            assert!(ret.has_exception());
            match ret.which()? {
                return_::Exception(exc) => {
                    let exc = exc?;
                    assert_eq!(exc.get_reason()?, "boom");
                    assert_eq!(exc.get_type()?, exception::Type::Failed);
                }
                _ => panic!("expected exception"),
            }
        }
        _ => panic!("expected return"),
    }
    Ok(())
}

#[test]
fn promised_answer_transform_keeps_order() -> capnp::Result<()> {
    let frame = round_trip(|m| {
        let mut call = m.init_call();
        call.set_question_id(8);
        let mut answer = call.init_target().init_promised_answer();
        answer.set_question_id(7);
        let mut ops = answer.init_transform(2);
        ops.reborrow().get(0).set_get_pointer_field(0);
        ops.reborrow().get(1).set_get_pointer_field(1);
        Ok(())
    })?;
    let message::Call(call) = root(&frame)?.which()? else {
        panic!("expected call");
    };
    let target = call?.get_target()?;
    assert!(target.has_promised_answer());
    let message_target::PromisedAnswer(answer) = target.which()? else {
        panic!("expected promised answer");
    };
    let answer = answer?;
    assert_eq!(answer.get_question_id(), 7);
    let ops: Vec<promised_answer::op::Which> = answer
        .get_transform()?
        .iter()
        .map(|op| op.which())
        .collect::<Result<_, NotInSchema>>()?;
    assert_eq!(
        ops,
        [
            promised_answer::op::GetPointerField(0),
            promised_answer::op::GetPointerField(1)
        ]
    );
    Ok(())
}

#[test]
fn release_counts_are_exact() -> capnp::Result<()> {
    for (id, count) in [(5, 3), (0, 0), (u32::MAX, u32::MAX)] {
        let frame = round_trip(|m| {
            let mut release = m.init_release();
            release.set_id(id);
            release.set_reference_count(count);
            Ok(())
        })?;
        let message::Release(release) = root(&frame)?.which()? else {
            panic!("expected release");
        };
        let release = release?;
        assert_eq!(release.get_id(), id);
        assert_eq!(release.get_reference_count(), count);
    }
    Ok(())
}

fn build_kind(tag: u16, mut m: message::Builder<'_>) -> capnp::Result<()> {
    match tag {
        0 => {
            let inner = round_trip(|m| {
                m.init_bootstrap().set_question_id(3);
                Ok(())
            })?;
            m.set_unimplemented(root(&inner)?)?;
        }
        1 => m.init_abort().set_reason("bye")?,
        2 => m.init_call().set_question_id(1),
        3 => m.init_return().set_answer_id(1),
        4 => m.init_finish().set_question_id(1),
        5 => m.init_resolve().set_promise_id(1),
        6 => m.init_release().set_id(1),
        7 => set_opaque(m.init_obsolete_save(), 70),
        8 => m.init_bootstrap().set_question_id(1),
        9 => set_opaque(m.init_obsolete_delete(), 90),
        10 => m.init_provide().set_question_id(1),
        11 => m.init_accept().set_question_id(1),
        12 => m.init_join().set_question_id(1),
        13 => {
            m.init_disembargo().get_context().set_accept(());
        }
        _ => unreachable!(),
    }
    Ok(())
}

#[test]
fn every_message_kind_round_trips() -> capnp::Result<()> {
    for tag in 0..14u16 {
        let frame = round_trip(|m| build_kind(tag, m))?;
        let body = root(&frame)?;
        assert_eq!(body.which_tag(), tag);
        match body.which()? {
            message::Unimplemented(inner) => {
                let message::Bootstrap(bootstrap) = inner?.which()? else {
                    panic!("expected echoed bootstrap");
                };
                assert_eq!(bootstrap?.get_question_id(), 3);
            }
            message::Abort(exc) => assert_eq!(exc?.get_reason()?, "bye"),
            message::Call(call) => assert_eq!(call?.get_question_id(), 1),
            message::Return(ret) => assert_eq!(ret?.get_answer_id(), 1),
            message::Finish(finish) => assert_eq!(finish?.get_question_id(), 1),
            message::Resolve(resolve) => assert_eq!(resolve?.get_promise_id(), 1),
            message::Release(release) => assert_eq!(release?.get_id(), 1),
            message::ObsoleteSave(ptr) => assert_eq!(opaque(ptr)?, 70),
            message::Bootstrap(bootstrap) => assert_eq!(bootstrap?.get_question_id(), 1),
            message::ObsoleteDelete(ptr) => assert_eq!(opaque(ptr)?, 90),
            message::Provide(provide) => assert_eq!(provide?.get_question_id(), 1),
            message::Accept(accept) => assert_eq!(accept?.get_question_id(), 1),
            message::Join(join) => assert_eq!(join?.get_question_id(), 1),
            message::Disembargo(disembargo) => assert_eq!(
                disembargo?.get_context().which()?,
                disembargo::context::Accept(())
            ),
        }
    }
    Ok(())
}

#[test]
fn unknown_message_kind_is_not_in_schema() -> capnp::Result<()> {
    let mut builder = capnp::message::Builder::new_default();
    builder
        .init_root::<message::Builder<'_>>()
        .init_finish()
        .set_question_id(1);
    let mut bytes = serialize::write_message_to_words(&builder);
    // Frame header, root pointer, then the message's data word with the tag first.
    bytes[16..18].copy_from_slice(&99u16.to_le_bytes());
    let frame = serialize::read_message(&mut &bytes[..], ReaderOptions::new())?;
    let body = root(&frame)?;
    assert!(matches!(body.which(), Err(NotInSchema(99))));
    assert_eq!(format!("{body:?}"), "<unknown message kind 99>");
    Ok(())
}

#[test]
fn call_fields_and_send_results_to() -> capnp::Result<()> {
    for branch in 0..3 {
        let frame = round_trip(|m| {
            let mut call = m.init_call();
            call.set_question_id(7);
            call.set_interface_id(0xa93f_c509_624c_72d9);
            call.set_method_id(2);
            call.set_allow_third_party_tail_call(branch == 2);
            call.reborrow().init_target().set_imported_cap(3);
            set_opaque(call.reborrow().init_params().init_content(), 100);
            let mut send_results_to = call.get_send_results_to();
            match branch {
                0 => send_results_to.set_caller(()),
                1 => send_results_to.set_yourself(()),
                _ => set_opaque(send_results_to.init_third_party(), 3),
            }
            Ok(())
        })?;
        let message::Call(call) = root(&frame)?.which()? else {
            panic!("expected call");
        };
        let call = call?;
        assert_eq!(call.get_question_id(), 7);
        assert_eq!(call.get_interface_id(), 0xa93f_c509_624c_72d9);
        assert_eq!(call.get_method_id(), 2);
        assert_eq!(call.get_allow_third_party_tail_call(), branch == 2);
        assert!(call.has_target() && call.has_params());
        assert_eq!(opaque(call.get_params()?.get_content())?, 100);
        match (branch, call.get_send_results_to().which()?) {
            (0, call::send_results_to::Caller(())) => {}
            (1, call::send_results_to::Yourself(())) => {}
            (2, call::send_results_to::ThirdParty(ptr)) => {
                assert!(call.get_send_results_to().has_third_party());
                assert_eq!(opaque(ptr)?, 3);
            }
            _ => panic!("wrong sendResultsTo branch for {branch}"),
        }
    }
    Ok(())
}

#[test]
fn absent_fields_read_as_defaults() -> capnp::Result<()> {
    let frame = round_trip(|m| {
        m.init_call().set_question_id(1);
        Ok(())
    })?;
    let message::Call(call) = root(&frame)?.which()? else {
        panic!("expected call");
    };
    let call = call?;
    assert!(!call.has_target());
    assert!(!call.has_params());
    assert!(matches!(
        call.get_target()?.which()?,
        message_target::ImportedCap(0)
    ));
    let params = call.get_params()?;
    assert!(params.get_content().is_null());
    assert_eq!(params.get_cap_table()?.len(), 0);
    assert!(matches!(
        call.get_send_results_to().which()?,
        call::send_results_to::Caller(())
    ));
    Ok(())
}

#[test]
fn payload_cap_table() -> capnp::Result<()> {
    let frame = round_trip(|m| {
        let mut ret = m.init_return();
        ret.set_answer_id(2);
        ret.set_release_param_caps(false);
        let mut results = ret.init_results();
        set_opaque(results.init_content(), 200);
        let mut table = results.init_cap_table(6);
        table.reborrow().get(0).set_none(());
        table.reborrow().get(1).set_sender_hosted(10);
        table.reborrow().get(2).set_sender_promise(11);
        table.reborrow().get(3).set_receiver_hosted(12);
        let mut answer = table.reborrow().get(4).init_receiver_answer();
        answer.set_question_id(13);
        answer.init_transform(1).get(0).set_noop(());
        let mut third = table.reborrow().get(5).init_third_party_hosted();
        third.set_vine_id(14);
        set_opaque(third.init_id(), 3);
        Ok(())
    })?;
    let message::Return(ret) = root(&frame)?.which()? else {
        panic!("expected return");
    };
    let ret = ret?;
    assert!(!ret.get_release_param_caps());
    assert!(ret.has_results());
    let return_::Results(results) = ret.which()? else {
        panic!("expected results");
    };
    let results = results?;
    assert_eq!(opaque(results.get_content())?, 200);
    let table = results.get_cap_table()?;
    assert_eq!(table.len(), 6);

    assert!(matches!(table.get(0).which()?, cap_descriptor::None(())));
    assert!(matches!(table.get(1).which()?, cap_descriptor::SenderHosted(10)));
    assert!(matches!(table.get(2).which()?, cap_descriptor::SenderPromise(11)));
    assert!(matches!(table.get(3).which()?, cap_descriptor::ReceiverHosted(12)));
    assert!(table.get(4).has_receiver_answer());
    let cap_descriptor::ReceiverAnswer(answer) = table.get(4).which()? else {
        panic!("expected receiver answer");
    };
    let answer = answer?;
    assert_eq!(answer.get_question_id(), 13);
    assert_eq!(
        answer.get_transform()?.get(0).which()?,
        promised_answer::op::Noop(())
    );
    let cap_descriptor::ThirdPartyHosted(third) = table.get(5).which()? else {
        panic!("expected third party");
    };
    let third = third?;
    assert_eq!(third.get_vine_id(), 14);
    assert_eq!(opaque(third.get_id())?, 3);
    assert!(table.try_get(6).is_none());
    Ok(())
}

#[test]
fn return_flag_only_variants() -> capnp::Result<()> {
    for branch in 0..4 {
        let frame = round_trip(|m| {
            let mut ret = m.init_return();
            ret.set_answer_id(5);
            match branch {
                0 => ret.set_canceled(()),
                1 => ret.set_results_sent_elsewhere(()),
                2 => ret.set_take_from_other_question(4),
                _ => set_opaque(ret.init_accept_from_third_party(), 9),
            }
            Ok(())
        })?;
        let message::Return(ret) = root(&frame)?.which()? else {
            panic!("expected return");
        };
        let ret = ret?;
        assert_eq!(ret.get_answer_id(), 5);
        match (branch, ret.which()?) {
            (0, return_::Canceled(())) => {}
            (1, return_::ResultsSentElsewhere(())) => {}
            (2, return_::TakeFromOtherQuestion(id)) => assert_eq!(id, 4),
            (3, return_::AcceptFromThirdParty(ptr)) => {
                assert!(ret.has_accept_from_third_party());
                assert_eq!(opaque(ptr)?, 9);
            }
            _ => panic!("wrong return branch for {branch}"),
        }
    }
    Ok(())
}

#[test]
fn finish_release_result_caps_defaults_to_true() -> capnp::Result<()> {
    for release in [true, false] {
        let frame = round_trip(|m| {
            let mut finish = m.init_finish();
            finish.set_question_id(3);
            if !release {
                finish.set_release_result_caps(false);
            }
            Ok(())
        })?;
        let message::Finish(finish) = root(&frame)?.which()? else {
            panic!("expected finish");
        };
        let finish = finish?;
        assert_eq!(finish.get_question_id(), 3);
        assert_eq!(finish.get_release_result_caps(), release);
    }
    Ok(())
}

#[test]
fn resolve_branches() -> capnp::Result<()> {
    let frame = round_trip(|m| {
        let mut resolve = m.init_resolve();
        resolve.set_promise_id(6);
        resolve.init_cap().set_sender_hosted(21);
        Ok(())
    })?;
    let message::Resolve(resolve) = root(&frame)?.which()? else {
        panic!("expected resolve");
    };
    let resolve = resolve?;
    assert_eq!(resolve.get_promise_id(), 6);
    assert!(resolve.has_cap() && !resolve.has_exception());
    let resolve::Cap(cap) = resolve.which()? else {
        panic!("expected cap");
    };
    assert!(matches!(cap?.which()?, cap_descriptor::SenderHosted(21)));

    let frame = round_trip(|m| {
        let mut exc = m.init_resolve().init_exception();
        exc.set_type(exception::Type::Disconnected);
        exc.set_reason("gone")?;
        Ok(())
    })?;
    let message::Resolve(resolve) = root(&frame)?.which()? else {
        panic!("expected resolve");
    };
    let resolve::Exception(exc) = resolve?.which()? else {
        panic!("expected exception");
    };
    let exc = exc?;
    assert_eq!(exc.get_type()?, exception::Type::Disconnected);
    assert_eq!(exc.get_reason()?, "gone");
    Ok(())
}

#[test]
fn disembargo_contexts() -> capnp::Result<()> {
    let expected = [
        disembargo::context::SenderLoopback(31),
        disembargo::context::ReceiverLoopback(32),
        disembargo::context::Accept(()),
        disembargo::context::Provide(33),
    ];
    for want in expected {
        let frame = round_trip(|m| {
            let mut disembargo = m.init_disembargo();
            disembargo.reborrow().init_target().set_imported_cap(30);
            let mut context = disembargo.get_context();
            match want {
                disembargo::context::SenderLoopback(id) => context.set_sender_loopback(id),
                disembargo::context::ReceiverLoopback(id) => context.set_receiver_loopback(id),
                disembargo::context::Accept(()) => context.set_accept(()),
                disembargo::context::Provide(id) => context.set_provide(id),
            }
            Ok(())
        })?;
        let message::Disembargo(disembargo) = root(&frame)?.which()? else {
            panic!("expected disembargo");
        };
        let disembargo = disembargo?;
        assert!(matches!(
            disembargo.get_target()?.which()?,
            message_target::ImportedCap(30)
        ));
        assert_eq!(disembargo.get_context().which()?, want);
    }
    Ok(())
}

#[test]
fn three_party_handoff() -> capnp::Result<()> {
    let frame = round_trip(|m| {
        let mut provide = m.init_provide();
        provide.set_question_id(40);
        provide.init_target().set_imported_cap(41);
        set_opaque(provide.init_recipient(), 3);
        Ok(())
    })?;
    let message::Provide(provide) = root(&frame)?.which()? else {
        panic!("expected provide");
    };
    let provide = provide?;
    assert_eq!(provide.get_question_id(), 40);
    assert!(provide.has_target() && provide.has_recipient());
    assert_eq!(opaque(provide.get_recipient())?, 3);

    let frame = round_trip(|m| {
        let mut accept = m.init_accept();
        accept.set_question_id(42);
        accept.set_embargo(true);
        set_opaque(accept.init_provision(), 123);
        Ok(())
    })?;
    let message::Accept(accept) = root(&frame)?.which()? else {
        panic!("expected accept");
    };
    let accept = accept?;
    assert_eq!(accept.get_question_id(), 42);
    assert!(accept.get_embargo());
    assert_eq!(opaque(accept.get_provision())?, 123);

    let frame = round_trip(|m| {
        let mut join = m.init_join();
        join.set_question_id(43);
        join.init_target().set_imported_cap(44);
        set_opaque(join.init_key_part(), 2);
        Ok(())
    })?;
    let message::Join(join) = root(&frame)?.which()? else {
        panic!("expected join");
    };
    let join = join?;
    assert_eq!(join.get_question_id(), 43);
    assert!(join.has_key_part());
    assert_eq!(opaque(join.get_key_part())?, 2);
    assert!(matches!(
        join.get_target()?.which()?,
        message_target::ImportedCap(44)
    ));
    Ok(())
}

#[test]
fn exception_conversions() -> capnp::Result<()> {
    let frame = round_trip(|m| {
        m.init_abort()
            .set_from_error(&capnp::Error::overloaded("too busy".to_string()))?;
        Ok(())
    })?;
    let message::Abort(exc) = root(&frame)?.which()? else {
        panic!("expected abort");
    };
    let exc = exc?;
    assert_eq!(exc.get_type()?, exception::Type::Overloaded);
    assert_eq!(exc.get_reason()?, "too busy");
    assert!(exc.get_type()?.is_retryable());

    let error = exc.to_error();
    assert_eq!(error.kind, ErrorKind::Overloaded);
    assert_eq!(error.extra, "remote exception: too busy");

    assert!(exception::Type::Disconnected.is_retryable());
    assert!(!exception::Type::Failed.is_retryable());
    assert!(!exception::Type::Unimplemented.is_retryable());
    Ok(())
}

#[test]
fn debug_names_the_variant() -> capnp::Result<()> {
    let frame = round_trip(|m| {
        let mut call = m.init_call();
        call.set_question_id(7);
        call.set_interface_id(0x1);
        call.set_method_id(2);
        Ok(())
    })?;
    assert_eq!(
        format!("{:?}", root(&frame)?),
        "call(question: 7, interface: 0x1, method: 2)"
    );
    Ok(())
}

#[test]
fn call_fields_survive_framing() {
    fn prop(question_id: u32, interface_id: u64, method_id: u16, imported_cap: u32) -> bool {
        let frame = round_trip(|m| {
            let mut call = m.init_call();
            call.set_question_id(question_id);
            call.set_interface_id(interface_id);
            call.set_method_id(method_id);
            call.init_target().set_imported_cap(imported_cap);
            Ok(())
        })
        .unwrap();
        let message::Call(call) = root(&frame).unwrap().which().unwrap() else {
            return false;
        };
        let call = call.unwrap();
        call.get_question_id() == question_id
            && call.get_interface_id() == interface_id
            && call.get_method_id() == method_id
            && matches!(
                call.get_target().unwrap().which(),
                Ok(message_target::ImportedCap(id)) if id == imported_cap
            )
    }

    quickcheck(prop as fn(u32, u64, u16, u32) -> bool);
}

#[test]
fn arbitrary_words_never_panic() {
    fn prop(words: Vec<u64>) -> TestResult {
        if words.is_empty() {
            return TestResult::discard();
        }
        let mut bytes = Vec::with_capacity(8 + words.len() * 8);
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&(words.len() as u32).to_le_bytes());
        for word in &words {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        let frame = match serialize::read_message(&mut &bytes[..], ReaderOptions::new()) {
            Ok(frame) => frame,
            Err(_) => return TestResult::passed(),
        };
        if let Ok(body) = root(&frame) {
            let _ = format!("{body:?}");
            if let Ok(message::Call(Ok(call))) = body.which() {
                let _ = call.get_target().map(|target| target.which());
                let _ = call.get_params().map(|params| params.get_cap_table().map(|t| t.len()));
            }
        }
        TestResult::passed()
    }

    quickcheck(prop as fn(Vec<u64>) -> TestResult);
}
